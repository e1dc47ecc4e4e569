#![allow(dead_code)]

use kodegen_bundler_electron::bundler::{
    BundleSettings, CommandStep, Error, FailurePolicy, PackageSettings, Platform, Result,
    Settings, SettingsBuilder, StepOutcome, StepRunner,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// A throwaway Electron-style app directory with every conventional asset.
pub struct TestApp {
    dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp app dir");
        let root = dir.path();

        std::fs::write(
            root.join("package.json"),
            r#"{ "name": "copycat", "productName": "CopyCat", "version": "1.4.2" }"#,
        )
        .expect("write package.json");
        std::fs::create_dir_all(root.join("assets")).expect("create assets");
        for icon in ["icon.icns", "icon.ico", "icon_Linux.png"] {
            std::fs::write(root.join("assets").join(icon), b"icon").expect("write icon");
        }
        std::fs::write(root.join("debian.json"), "{}").expect("write debian.json");
        std::fs::write(root.join("redhat.json"), "{}").expect("write redhat.json");

        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn out_dir(&self) -> PathBuf {
        self.path().join("build")
    }

    pub fn remove_icon(&self, platform: Platform) {
        let icon = match platform {
            Platform::Darwin => "icon.icns",
            Platform::Win32 => "icon.ico",
            Platform::Linux => "icon_Linux.png",
        };
        std::fs::remove_file(self.path().join("assets").join(icon)).expect("remove icon");
    }

    /// Writes an executable shell script into the app directory.
    pub fn write_script(&self, name: &str, body: &str) {
        std::fs::write(self.path().join(name), format!("#!/bin/sh\n{}\n", body))
            .expect("write script");
    }

    pub fn settings(&self) -> Settings {
        self.settings_with(FailurePolicy::StopOnFirstFailure, BundleSettings::default())
    }

    pub fn settings_with(&self, policy: FailurePolicy, bundle: BundleSettings) -> Settings {
        SettingsBuilder::new()
            .app_directory(self.path())
            .package_settings(PackageSettings {
                product_name: "CopyCat".into(),
                version: Some("1.4.2".into()),
                ..Default::default()
            })
            .bundle_settings(bundle)
            .failure_policy(policy)
            .build()
            .expect("build settings")
    }
}

/// Bundle settings that run each tool as `sh <tool-script>` from the app directory.
pub fn shell_tools() -> BundleSettings {
    let mut bundle = BundleSettings::default();
    bundle.tools.runner = Some("sh".to_string());
    bundle
}

type FailWhen = Box<dyn Fn(&CommandStep) -> Option<Error>>;

/// Records every step it is asked to run and never spawns anything.
pub struct SpyRunner {
    calls: Mutex<Vec<CommandStep>>,
    fail_when: FailWhen,
}

impl SpyRunner {
    pub fn succeeding() -> Self {
        Self::failing_when(|_| None)
    }

    pub fn failing_when(f: impl Fn(&CommandStep) -> Option<Error> + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_when: Box::new(f),
        }
    }

    /// Fails every step whose arguments contain `--platform=<platform>`.
    pub fn failing_platform(platform: Platform) -> Self {
        let flag = format!("--platform={}", platform);
        Self::failing_when(move |step| {
            step.arguments
                .iter()
                .any(|a| *a == flag)
                .then(|| step_failed(step, 2))
        })
    }

    pub fn calls(&self) -> Vec<CommandStep> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

impl StepRunner for SpyRunner {
    async fn run(&self, step: &CommandStep) -> Result<StepOutcome> {
        self.calls.lock().expect("calls lock").push(step.clone());
        match (self.fail_when)(step) {
            Some(error) => Err(error),
            None => Ok(StepOutcome {
                code: 0,
                duration: Duration::ZERO,
            }),
        }
    }
}

pub fn step_failed(step: &CommandStep, code: i32) -> Error {
    Error::StepFailed {
        step: Box::new(step.clone()),
        code: Some(code),
        stderr_tail: vec!["boom".to_string()],
    }
}

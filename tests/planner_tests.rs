//! Tests for command planning

mod common;

use common::{SpyRunner, TestApp};
use kodegen_bundler_electron::bundler::{
    BundleSettings, Bundler, Error, FailurePolicy, InstallerFormat, Platform, PlatformSelection,
    StepKind, TargetState, builder::planner::packaged_app_dir, plan, resolve_targets,
};
use tokio_util::sync::CancellationToken;

fn targets_for(
    app: &TestApp,
    platform: &str,
    arch: &str,
) -> Vec<kodegen_bundler_electron::bundler::BuildTarget> {
    let selection = PlatformSelection::parse(&[platform]).unwrap();
    resolve_targets(arch, &selection, &app.settings()).unwrap()
}

#[test]
fn test_darwin_plan_packages_then_builds_dmg() {
    let app = TestApp::new();
    let settings = app.settings();
    let target = &targets_for(&app, "darwin", "arm64")[0];

    let plan = plan(target, &settings).unwrap();

    assert_eq!(plan.len(), 2);
    let package = &plan.steps()[0];
    assert_eq!(package.kind, StepKind::Package);
    assert_eq!(package.executable, "npx");
    assert_eq!(package.working_directory, app.path());

    let out = app.out_dir();
    let icon = app.path().join("assets/icon.icns");
    assert_eq!(
        package.arguments,
        vec![
            "electron-packager".to_string(),
            ".".to_string(),
            "CopyCat".to_string(),
            "--platform=darwin".to_string(),
            "--arch=arm64".to_string(),
            format!("--icon={}", icon.display()),
            "--overwrite".to_string(),
            format!("--out={}", out.display()),
        ]
    );

    let dmg = &plan.steps()[1];
    assert_eq!(dmg.kind, StepKind::Installer(InstallerFormat::Dmg));
    assert_eq!(dmg.arguments[0], "electron-installer-dmg");
    let app_bundle = out.join("CopyCat-darwin-arm64").join("CopyCat.app");
    assert_eq!(dmg.arguments[1], app_bundle.display().to_string());
    assert_eq!(dmg.arguments[2], "CopyCat");
    assert!(dmg.arguments.contains(&format!("--out={}", out.display())));
    assert!(dmg.arguments.contains(&"--overwrite".to_string()));
    assert!(dmg.arguments.contains(&format!("--icon={}", icon.display())));
}

#[test]
fn test_win32_plan_has_only_packaging() {
    let app = TestApp::new();
    let settings = app.settings();
    let target = &targets_for(&app, "win32", "x64")[0];

    let plan = plan(target, &settings).unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.steps()[0].kind, StepKind::Package);
    assert!(
        plan.steps()[0]
            .arguments
            .contains(&"--platform=win32".to_string())
    );
}

#[test]
fn test_linux_plan_uses_distro_arch_names() {
    let app = TestApp::new();
    let settings = app.settings();
    let target = &targets_for(&app, "linux", "x64")[0];

    let plan = plan(target, &settings).unwrap();

    assert_eq!(plan.len(), 3);
    let package_dir = packaged_app_dir(target, &settings);
    assert_eq!(package_dir, app.out_dir().join("CopyCat-linux-x64"));

    let deb = &plan.steps()[1];
    assert_eq!(deb.kind, StepKind::Installer(InstallerFormat::Deb));
    assert_eq!(
        deb.arguments,
        vec![
            "electron-installer-debian".to_string(),
            "--src".to_string(),
            package_dir.display().to_string(),
            "--dest".to_string(),
            app.out_dir().display().to_string(),
            "--arch".to_string(),
            "amd64".to_string(),
            "--config".to_string(),
            app.path().join("debian.json").display().to_string(),
        ]
    );

    let rpm = &plan.steps()[2];
    assert_eq!(rpm.kind, StepKind::Installer(InstallerFormat::Rpm));
    assert_eq!(rpm.arguments[0], "electron-installer-redhat");
    let arch = rpm.arguments.iter().position(|a| a == "--arch").unwrap();
    assert_eq!(rpm.arguments[arch + 1], "x86_64");
    assert!(
        rpm.arguments
            .contains(&app.path().join("redhat.json").display().to_string())
    );
}

#[test]
fn test_every_plan_starts_with_packaging() {
    let app = TestApp::new();
    let settings = app.settings();
    let targets = resolve_targets("arm64", &PlatformSelection::All, &settings).unwrap();

    for target in &targets {
        let plan = plan(target, &settings).unwrap();
        assert!(!plan.is_empty());
        assert_eq!(plan.steps()[0].kind, StepKind::Package);
        assert!(
            plan.steps()[1..]
                .iter()
                .all(|s| matches!(s.kind, StepKind::Installer(_)))
        );
        assert_eq!(plan.len(), 1 + target.installer_formats.len());
    }
}

#[test]
fn test_planning_is_deterministic() {
    let app = TestApp::new();
    let settings = app.settings();
    let targets = resolve_targets("x64", &PlatformSelection::All, &settings).unwrap();

    for target in &targets {
        assert_eq!(plan(target, &settings).unwrap(), plan(target, &settings).unwrap());
    }
}

#[test]
fn test_distinct_targets_get_distinct_package_dirs() {
    let app = TestApp::new();
    let settings = app.settings();
    let mut dirs = Vec::new();
    for arch in ["x64", "arm64"] {
        for target in resolve_targets(arch, &PlatformSelection::All, &settings).unwrap() {
            dirs.push(packaged_app_dir(&target, &settings));
        }
    }

    let count = dirs.len();
    dirs.sort();
    dirs.dedup();
    assert_eq!(dirs.len(), count);
}

#[test]
fn test_missing_icon_is_reported() {
    let app = TestApp::new();
    app.remove_icon(Platform::Linux);
    let settings = app.settings();
    let target = &targets_for(&app, "linux", "x64")[0];

    let err = plan(target, &settings).unwrap_err();
    match err {
        Error::MissingAsset { platform, path } => {
            assert_eq!(platform, "Linux");
            assert_eq!(path, app.path().join("assets/icon_Linux.png"));
        }
        other => panic!("expected MissingAsset, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_icon_spawns_nothing() {
    let app = TestApp::new();
    app.remove_icon(Platform::Darwin);
    let settings = app.settings();
    let targets = targets_for(&app, "darwin", "arm64");
    let runner = SpyRunner::succeeding();

    let summary = Bundler::new(settings)
        .run(&targets, &runner, &(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(runner.call_count(), 0);
    assert_eq!(summary.results.len(), 1);
    let result = &summary.results[0];
    assert_eq!(result.state, TargetState::Failed);
    assert!(result.failed_step.is_none());
    assert!(
        result
            .error_message
            .as_deref()
            .unwrap()
            .contains("icon.icns")
    );
}

#[test]
fn test_without_runner_tools_are_invoked_directly() {
    let app = TestApp::new();
    let mut bundle = BundleSettings::default();
    bundle.tools.runner = Some(String::new());
    bundle.tools.packager = "/opt/tools/electron-packager".to_string();
    let settings = app.settings_with(FailurePolicy::StopOnFirstFailure, bundle);
    let target = &resolve_targets(
        "x64",
        &PlatformSelection::parse(&["win32"]).unwrap(),
        &settings,
    )
    .unwrap()[0];

    let plan = plan(target, &settings).unwrap();

    let step = &plan.steps()[0];
    assert_eq!(step.executable, "/opt/tools/electron-packager");
    assert_eq!(step.arguments[0], ".");
}

#[cfg(unix)]
#[test]
fn test_display_command_quotes_paths_with_spaces() {
    use kodegen_bundler_electron::bundler::builder::planner::quote_arg;

    assert_eq!(quote_arg("--arch=x64"), "--arch=x64");
    assert_eq!(quote_arg("/tmp/My App"), "'/tmp/My App'");
    assert_eq!(quote_arg("it's"), r#"'it'\''s'"#);
    assert_eq!(quote_arg(""), "''");

    let app = TestApp::new();
    let settings = app.settings();
    let target = &targets_for(&app, "win32", "x64")[0];
    let plan = plan(target, &settings).unwrap();
    assert!(
        plan.steps()[0]
            .display_command()
            .starts_with("npx electron-packager . CopyCat --platform=win32")
    );
}

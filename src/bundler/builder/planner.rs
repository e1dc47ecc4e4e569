//! Command planning.
//!
//! Turns a [`BuildTarget`] into an ordered [`BuildPlan`]: one packaging step
//! followed by the installer steps for the target's formats. Planning runs
//! no processes; its only filesystem access is the icon existence check.

use crate::bundler::{
    Error, Result, Settings,
    platform::{BuildTarget, InstallerFormat, linux, macos},
};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Role of a step within a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    /// Produces the packaged application tree.
    Package,
    /// Builds an installer from the packaged tree.
    Installer(InstallerFormat),
}

/// A single external tool invocation.
///
/// Arguments are passed to the process as an argv vector, never through a
/// shell.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CommandStep {
    /// Human-readable summary, e.g. "Packaging CopyCat for macOS (arm64)"
    pub description: String,
    /// Role of this step
    pub kind: StepKind,
    /// Executable name or path
    pub executable: String,
    /// Arguments in order
    pub arguments: Vec<String>,
    /// Directory the process starts in
    pub working_directory: PathBuf,
}

impl CommandStep {
    /// Builds a step for `tool`, prefixing the configured launcher if any.
    pub(crate) fn for_tool(
        settings: &Settings,
        kind: StepKind,
        description: String,
        tool: &str,
        tool_args: Vec<String>,
    ) -> Self {
        let tools = &settings.bundle_settings().tools;
        let (executable, arguments) = match tools.runner() {
            Some(runner) => {
                let mut arguments = Vec::with_capacity(tool_args.len() + 1);
                arguments.push(tool.to_string());
                arguments.extend(tool_args);
                (runner.to_string(), arguments)
            }
            None => (tool.to_string(), tool_args),
        };

        Self {
            description,
            kind,
            executable,
            arguments,
            working_directory: settings.app_directory().to_path_buf(),
        }
    }

    /// Command line quoted for the host shell.
    pub fn display_command(&self) -> String {
        std::iter::once(self.executable.as_str())
            .chain(self.arguments.iter().map(String::as_str))
            .map(quote_arg)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Ordered steps for one target.
///
/// The first step is always [`StepKind::Package`]; installer steps follow it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildPlan {
    target: BuildTarget,
    steps: Vec<CommandStep>,
}

impl BuildPlan {
    /// Target this plan builds.
    pub fn target(&self) -> &BuildTarget {
        &self.target
    }

    /// All steps in execution order.
    pub fn steps(&self) -> &[CommandStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Plans always hold a packaging step, so this is false for any planned target.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Plans the tool invocations for `target`.
///
/// # Errors
///
/// - [`Error::MissingAsset`] when the target's icon does not exist
/// - [`Error::GenericError`] when a path is not valid UTF-8
pub fn plan(target: &BuildTarget, settings: &Settings) -> Result<BuildPlan> {
    if !target.icon_path.is_file() {
        return Err(Error::MissingAsset {
            platform: target.platform.label().to_string(),
            path: target.icon_path.clone(),
        });
    }

    let mut steps = Vec::with_capacity(1 + target.installer_formats.len());
    steps.push(package_step(target, settings)?);

    let package_dir = packaged_app_dir(target, settings);
    for format in &target.installer_formats {
        let step = match format {
            InstallerFormat::Dmg => macos::dmg_step(target, settings, &package_dir)?,
            InstallerFormat::Deb => linux::debian_step(target, settings, &package_dir)?,
            InstallerFormat::Rpm => linux::redhat_step(target, settings, &package_dir)?,
        };
        steps.push(step);
    }

    log::debug!("Planned {} step(s) for {}", steps.len(), target);

    Ok(BuildPlan {
        target: target.clone(),
        steps,
    })
}

/// Directory the packager writes for `target`: `{out}/{name}-{platform}-{arch}`.
pub fn packaged_app_dir(target: &BuildTarget, settings: &Settings) -> PathBuf {
    settings.out_directory().join(format!(
        "{}-{}-{}",
        settings.product_name(),
        target.platform,
        target.arch
    ))
}

fn package_step(target: &BuildTarget, settings: &Settings) -> Result<CommandStep> {
    let name = settings.product_name();
    let tools = &settings.bundle_settings().tools;

    Ok(CommandStep::for_tool(
        settings,
        StepKind::Package,
        format!("Packaging {} for {}", name, target),
        &tools.packager,
        vec![
            ".".to_string(),
            name.to_string(),
            format!("--platform={}", target.platform),
            format!("--arch={}", target.arch),
            format!("--icon={}", path_arg(&target.icon_path)?),
            "--overwrite".to_string(),
            format!("--out={}", path_arg(settings.out_directory())?),
        ],
    ))
}

/// Converts a path into a process argument.
pub(crate) fn path_arg(path: &Path) -> Result<String> {
    path.to_str().map(str::to_owned).ok_or_else(|| {
        Error::GenericError(format!(
            "Invalid path (contains non-UTF8 characters): {}",
            path.display()
        ))
    })
}

/// Quotes one argument for display in the host shell.
#[cfg(not(windows))]
pub fn quote_arg(arg: &str) -> Cow<'_, str> {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r#"'\''"#)))
    }
}

/// Quotes one argument for display in the host shell.
#[cfg(windows)]
pub fn quote_arg(arg: &str) -> Cow<'_, str> {
    if !arg.is_empty() && !arg.contains([' ', '\t', '"']) {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("\"{}\"", arg.replace('"', "\\\"")))
    }
}

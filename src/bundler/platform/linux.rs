//! Linux installer steps (.deb and .rpm).
//!
//! Both builders read the same packaged tree and do not depend on each
//! other; only the packaging step must precede them.

use crate::bundler::{
    Result, Settings,
    builder::{CommandStep, StepKind, planner::path_arg},
    platform::{BuildTarget, InstallerFormat},
};
use std::path::Path;

pub(crate) fn debian_step(
    target: &BuildTarget,
    settings: &Settings,
    package_dir: &Path,
) -> Result<CommandStep> {
    let installers = &settings.bundle_settings().installers;
    installer_step(
        target,
        settings,
        package_dir,
        InstallerFormat::Deb,
        target.arch.debian_name(),
        &settings.resolve_app_path(&installers.debian_config),
    )
}

pub(crate) fn redhat_step(
    target: &BuildTarget,
    settings: &Settings,
    package_dir: &Path,
) -> Result<CommandStep> {
    let installers = &settings.bundle_settings().installers;
    installer_step(
        target,
        settings,
        package_dir,
        InstallerFormat::Rpm,
        target.arch.rpm_name(),
        &settings.resolve_app_path(&installers.redhat_config),
    )
}

fn installer_step(
    target: &BuildTarget,
    settings: &Settings,
    package_dir: &Path,
    format: InstallerFormat,
    arch_name: &str,
    config: &Path,
) -> Result<CommandStep> {
    if !config.exists() {
        log::warn!(
            "{} installer config not found: {} (the installer tool will report it)",
            format,
            config.display()
        );
    }

    let tools = &settings.bundle_settings().tools;

    Ok(CommandStep::for_tool(
        settings,
        StepKind::Installer(format),
        format!("Creating .{} installer for {}", format, target),
        tools.installer_tool(format),
        vec![
            "--src".to_string(),
            path_arg(package_dir)?,
            "--dest".to_string(),
            path_arg(settings.out_directory())?,
            "--arch".to_string(),
            arch_name.to_string(),
            "--config".to_string(),
            path_arg(config)?,
        ],
    ))
}

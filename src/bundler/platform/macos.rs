//! macOS installer steps.

use crate::bundler::{
    Result, Settings,
    builder::{CommandStep, StepKind, planner::path_arg},
    platform::{BuildTarget, InstallerFormat},
};
use std::path::{Path, PathBuf};

/// The `.app` bundle inside the packaged tree.
pub(crate) fn app_bundle_path(settings: &Settings, package_dir: &Path) -> PathBuf {
    package_dir.join(format!("{}.app", settings.product_name()))
}

/// Disk image written next to the packaged trees.
pub(crate) fn dmg_path(settings: &Settings) -> PathBuf {
    settings
        .out_directory()
        .join(format!("{}.dmg", settings.product_name()))
}

/// Wraps the packaged `.app` into a `.dmg`.
///
/// Reads the bundle produced by the packaging step, so it must run after it.
pub(crate) fn dmg_step(
    target: &BuildTarget,
    settings: &Settings,
    package_dir: &Path,
) -> Result<CommandStep> {
    let name = settings.product_name();
    let tools = &settings.bundle_settings().tools;

    Ok(CommandStep::for_tool(
        settings,
        StepKind::Installer(InstallerFormat::Dmg),
        format!("Creating DMG installer for {}", target),
        tools.installer_tool(InstallerFormat::Dmg),
        vec![
            path_arg(&app_bundle_path(settings, package_dir))?,
            name.to_string(),
            format!("--out={}", path_arg(settings.out_directory())?),
            "--overwrite".to_string(),
            format!("--icon={}", path_arg(&target.icon_path)?),
        ],
    ))
}

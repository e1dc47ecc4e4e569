//! Locating the artifacts a successful target produced.
//!
//! The external tools choose their own file names, so installers are found
//! by pattern in the output directory. Discovery is best effort: anything
//! missing is logged and skipped, never turned into a build failure.

use super::{
    checksum::{calculate_sha256, total_size},
    planner::{packaged_app_dir, path_arg},
};
use crate::bundler::{
    Result, Settings,
    platform::{BuildTarget, InstallerFormat, macos},
};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What an artifact is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Packaged application tree
    PackagedApp,
    /// Installer file
    Installer(InstallerFormat),
}

/// A file or directory produced by a target.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BundledArtifact {
    /// What was produced
    pub kind: ArtifactKind,
    /// Location on disk
    pub path: PathBuf,
    /// Size in bytes (sum of files for directories)
    pub size: u64,
    /// Hex-encoded SHA-256 of the file or tree
    pub checksum: String,
}

/// Collects the packaged tree and installers for `target`.
pub async fn collect_artifacts(target: &BuildTarget, settings: &Settings) -> Vec<BundledArtifact> {
    let mut found = vec![(ArtifactKind::PackagedApp, Some(packaged_app_dir(target, settings)))];

    for format in &target.installer_formats {
        let path = match installer_path(target, settings, *format) {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Could not search for .{} installer: {}", format, e);
                None
            }
        };
        found.push((ArtifactKind::Installer(*format), path));
    }

    let mut artifacts = Vec::with_capacity(found.len());
    for (kind, path) in found {
        let Some(path) = path.filter(|p| p.exists()) else {
            log::warn!("Expected {:?} artifact for {} was not found", kind, target);
            continue;
        };

        let checksum = match calculate_sha256(&path).await {
            Ok(checksum) => checksum,
            Err(e) => {
                log::warn!("Could not checksum {}: {}", path.display(), e);
                continue;
            }
        };

        artifacts.push(BundledArtifact {
            kind,
            size: total_size(&path),
            path,
            checksum,
        });
    }

    artifacts
}

fn installer_path(
    target: &BuildTarget,
    settings: &Settings,
    format: InstallerFormat,
) -> Result<Option<PathBuf>> {
    match format {
        InstallerFormat::Dmg => Ok(Some(macos::dmg_path(settings))),
        InstallerFormat::Deb => newest_match(
            settings.out_directory(),
            &format!("*_{}.deb", target.arch.debian_name()),
        ),
        InstallerFormat::Rpm => newest_match(
            settings.out_directory(),
            &format!("*.{}.rpm", target.arch.rpm_name()),
        ),
    }
}

/// Most recently modified file in `dir` matching `file_pattern`.
fn newest_match(dir: &Path, file_pattern: &str) -> Result<Option<PathBuf>> {
    let pattern = format!("{}/{}", glob::Pattern::escape(&path_arg(dir)?), file_pattern);

    let newest = glob::glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .map(|path| {
            let modified = path
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path);

    Ok(newest)
}

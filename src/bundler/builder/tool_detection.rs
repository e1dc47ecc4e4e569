//! External tool detection and availability checking.
//!
//! Step executables are resolved on `PATH` just before they are spawned so a
//! missing tool surfaces as [`Error::ToolNotFound`] instead of an opaque
//! spawn error.

use crate::bundler::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Check if the default `npx` launcher is available.
///
/// Cached result to avoid repeated subprocess calls.
pub static HAS_NPX: LazyLock<bool> = LazyLock::new(|| match which::which("npx") {
    Ok(path) => {
        log::debug!("Found npx at: {}", path.display());

        match std::process::Command::new(&path).arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                log::info!("✓ npx available: {}", version.trim());
                true
            }
            Ok(output) => {
                log::warn!(
                    "npx found at {} but --version check failed (exit code: {:?}). \
                     Stderr: {}",
                    path.display(),
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr)
                );
                false
            }
            Err(e) => {
                log::warn!(
                    "npx found at {} but failed to execute: {}. Check file permissions.",
                    path.display(),
                    e
                );
                false
            }
        }
    }
    Err(e) => {
        log::debug!("npx not found in PATH: {}", e);
        false
    }
});

/// Resolves `executable` to a path, searching `PATH` for bare names and
/// `working_directory` for relative paths.
pub fn resolve_executable(executable: &str, working_directory: &Path) -> Result<PathBuf> {
    which::which_in(executable, std::env::var_os("PATH"), working_directory).map_err(|error| {
        Error::ToolNotFound {
            tool: executable.to_string(),
            error,
        }
    })
}

//! Core Settings struct and implementations.

use super::{BundleSettings, PackageSettings};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What the orchestrator does after a target fails.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the run at the first failed target. Later targets are never attempted.
    #[default]
    StopOnFirstFailure,
    /// Keep building the remaining targets and report every result.
    ContinueOnFailure,
}

/// Main settings for bundler operations.
///
/// Constructed via [`super::SettingsBuilder`]. All paths are absolute.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_electron::bundler::{PackageSettings, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_electron::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .app_directory("/work/copycat")
///     .package_settings(PackageSettings {
///         product_name: "CopyCat".into(),
///         ..Default::default()
///     })
///     .build()?;
/// assert!(settings.out_directory().ends_with("build"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    package: PackageSettings,
    bundle_settings: BundleSettings,
    app_directory: PathBuf,
    out_directory: PathBuf,
    failure_policy: FailurePolicy,
    step_timeout: Option<Duration>,
}

impl Settings {
    /// Returns the product name.
    pub fn product_name(&self) -> &str {
        &self.package.product_name
    }

    /// Returns the version string, if known.
    pub fn version_string(&self) -> Option<&str> {
        self.package.version.as_deref()
    }

    /// Application source directory. Every step runs here.
    pub fn app_directory(&self) -> &Path {
        &self.app_directory
    }

    /// Output directory receiving packaged trees and installers.
    pub fn out_directory(&self) -> &Path {
        &self.out_directory
    }

    /// Returns the bundle settings.
    pub fn bundle_settings(&self) -> &BundleSettings {
        &self.bundle_settings
    }

    /// Returns the failure policy across targets.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Per-step timeout, if any.
    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout
    }

    /// Resolves a configured path against the application directory.
    pub fn resolve_app_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.app_directory.join(path)
        }
    }

    pub(super) fn new(
        package: PackageSettings,
        bundle_settings: BundleSettings,
        app_directory: PathBuf,
        out_directory: PathBuf,
        failure_policy: FailurePolicy,
        step_timeout: Option<Duration>,
    ) -> Self {
        Self {
            package,
            bundle_settings,
            app_directory,
            out_directory,
            failure_policy,
            step_timeout,
        }
    }
}

//! Builder for constructing Settings.

use super::{BundleSettings, FailurePolicy, PackageSettings, Settings};
use crate::bundler::error::{Context, ErrorExt};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Builder for constructing [`Settings`].
///
/// Relative paths are made absolute against the current directory, and the
/// output directory defaults to `<app>/build`.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_electron::bundler::{FailurePolicy, PackageSettings, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_electron::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .app_directory(".")
///     .out_directory("dist")
///     .package_settings(PackageSettings {
///         product_name: "CopyCat".into(),
///         ..Default::default()
///     })
///     .failure_policy(FailurePolicy::ContinueOnFailure)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    app_directory: Option<PathBuf>,
    out_directory: Option<PathBuf>,
    package_settings: Option<PackageSettings>,
    bundle_settings: BundleSettings,
    failure_policy: FailurePolicy,
    step_timeout: Option<Duration>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the application source directory.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn app_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.app_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output directory. Relative paths resolve against the app directory.
    ///
    /// Default: `<app>/build`
    pub fn out_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.out_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets application metadata.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn package_settings(mut self, settings: PackageSettings) -> Self {
        self.package_settings = Some(settings);
        self
    }

    /// Sets bundle configuration.
    ///
    /// Default: [`BundleSettings::default`]
    pub fn bundle_settings(mut self, settings: BundleSettings) -> Self {
        self.bundle_settings = settings;
        self
    }

    /// Sets the failure policy across targets.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets a per-step timeout.
    pub fn step_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `app_directory` or `package_settings` is missing,
    /// the product name is blank, or a path cannot be made absolute.
    pub fn build(self) -> crate::bundler::Result<Settings> {
        let package = self
            .package_settings
            .context("package_settings is required")?;
        if package.product_name.trim().is_empty() {
            crate::bail!("product name must not be empty");
        }

        let app_directory = self.app_directory.context("app_directory is required")?;
        let app_directory = app_directory
            .absolutize()
            .fs_context("resolving app directory", &app_directory)?
            .into_owned();

        let out_directory = match self.out_directory {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => app_directory.join(dir),
            None => app_directory.join("build"),
        };
        let out_directory = out_directory
            .absolutize()
            .fs_context("resolving output directory", &out_directory)?
            .into_owned();

        Ok(Settings::new(
            package,
            self.bundle_settings,
            app_directory,
            out_directory,
            self.failure_policy,
            self.step_timeout,
        ))
    }
}

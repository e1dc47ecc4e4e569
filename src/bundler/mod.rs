//! Multi-target packaging for Electron applications.
//!
//! Resolves (platform, arch) targets, plans the external packager and
//! installer invocations for each, and runs them one at a time.
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_electron::bundler::{
//!     Arch, Bundler, LogOutput, PackageSettings, PlatformSelection, ProcessRunner,
//!     SettingsBuilder, resolve_targets,
//! };
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> kodegen_bundler_electron::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .app_directory(".")
//!     .package_settings(PackageSettings {
//!         product_name: "CopyCat".into(),
//!         ..Default::default()
//!     })
//!     .build()?;
//!
//! let host = Arch::host()?;
//! let targets = resolve_targets(host.packager_name(), &PlatformSelection::All, &settings)?;
//!
//! let cancel = CancellationToken::new();
//! let runner = ProcessRunner::new(Arc::new(LogOutput), cancel.clone());
//! let summary = Bundler::new(settings).run(&targets, &runner, &(), &cancel).await?;
//! assert!(summary.all_succeeded());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod platform;
pub mod settings;

pub use builder::{
    ArtifactKind, BuildObserver, BuildPlan, BuildResult, BuildSummary, BundledArtifact, Bundler,
    CommandStep, LogOutput, ProcessRunner, StepKind, StepOutcome, StepOutput, StepRunner,
    TargetState, plan,
};
pub use error::{Error, Result};
pub use platform::{BuildTarget, InstallerFormat, Platform, PlatformSelection, resolve_targets};
pub use settings::{
    Arch, BundleSettings, FailurePolicy, IconSettings, InstallerSettings, PackageSettings,
    Settings, SettingsBuilder, ToolSettings,
};

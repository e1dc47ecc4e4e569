//! Configuration structures for bundling operations.
//!
//! This module provides the configuration types for multi-target packaging:
//! application metadata, icon and installer settings, external tool names,
//! and a builder for constructing [`Settings`].

mod arch;
mod builder;
mod bundle;
mod core;
mod package;

pub use arch::Arch;
pub use builder::SettingsBuilder;
pub use bundle::{BundleSettings, IconSettings, InstallerSettings, ToolSettings};
pub use self::core::{FailurePolicy, Settings};
pub use package::PackageSettings;

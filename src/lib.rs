//! Multi-target packaging orchestrator for Electron applications.
//!
//! This library plans and runs the external tools that turn an application
//! directory into:
//! - macOS bundles (.app) and disk images (.dmg)
//! - Windows packaged application trees (.exe)
//! - Linux packages (.deb, .rpm)
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};

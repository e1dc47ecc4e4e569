//! Error types for the command line front end.
//!
//! This module defines the top-level error returned by [`crate::cli::run`]
//! with actionable recovery suggestions.

use crate::bundler::Error as BuildError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all CLI operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument or configuration errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundler errors
    #[error("{0}")]
    Bundler(#[from] BuildError),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument} ({reason})")]
    MissingArgument {
        /// Argument name
        argument: String,
        /// Why it was needed
        reason: String,
    },

    /// Configuration file could not be read or parsed
    #[error("Invalid configuration {path}: {reason}")]
    InvalidConfig {
        /// Config file path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            BundlerError::Bundler(error) => build_error_suggestions(error),
            BundlerError::Cli(CliError::MissingArgument { argument, .. }) => vec![format!(
                "Pass {} or add it to package.json / bundle.toml",
                argument
            )],
            BundlerError::Cli(CliError::InvalidConfig { .. }) | BundlerError::Toml(_) => {
                vec!["Check bundle.toml against the documented [app], [output], [icons], [installers], [tools] and [build] sections".to_string()]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

fn build_error_suggestions(error: &BuildError) -> Vec<String> {
    match error {
        BuildError::UnsupportedArchitecture(_) => {
            vec!["Pass --arch x64 or --arch arm64 to build for a supported architecture".to_string()]
        }
        BuildError::UnsupportedPlatform(_) => {
            vec!["Use --platform with darwin, win32, linux or all".to_string()]
        }
        BuildError::MissingAsset { .. } => vec![
            "Add the icon file, or point the [icons] section of bundle.toml at it".to_string(),
        ],
        BuildError::ToolNotFound { .. } => vec![
            "Install Node.js so npx is on PATH, or set [tools] runner in bundle.toml".to_string(),
        ],
        BuildError::Context(_, inner) => build_error_suggestions(inner),
        _ => vec!["Check the error message above for specific details".to_string()],
    }
}

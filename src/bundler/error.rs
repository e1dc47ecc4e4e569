//! Error types for bundler operations.
//!
//! Provides contextual error chaining, filesystem-specific errors, and the
//! failure taxonomy used by the build orchestrator:
//!
//! - [`Error::UnsupportedArchitecture`] - host or requested arch cannot be built
//! - [`Error::MissingAsset`] - a target's icon is absent at plan time
//! - [`Error::StepFailed`] - an external tool exited with non-zero status
//! - [`Error::Cancelled`] - the run was interrupted by the user
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_electron::bundler::error::{Context, ErrorExt, Result};
//! use std::path::Path;
//!
//! fn read_notes(path: &Path) -> Result<String> {
//!     let contents = std::fs::read_to_string(path)
//!         .fs_context("reading release notes", path)?;
//!     let first = contents
//!         .lines()
//!         .next()
//!         .map(str::to_owned)
//!         .context("release notes are empty")?;
//!     Ok(first)
//! }
//! ```

use super::builder::CommandStep;
use std::{fmt::Display, io, path::PathBuf};
use thiserror::Error as DeriveError;

/// Errors returned by the bundler.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "creating output directory")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// An external tool could not be spawned at all.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command line that failed to start
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// Executable for a step is not on `PATH`.
    #[error("required tool `{tool}` not found: {error}")]
    ToolNotFound {
        /// Executable name as planned
        tool: String,
        /// Lookup failure
        error: which::Error,
    },

    /// Host (or overridden) CPU architecture has no packager equivalent.
    #[error("unsupported architecture: {0} (supported: x64, arm64)")]
    UnsupportedArchitecture(String),

    /// Platform name not recognised.
    #[error("unsupported platform: {0} (supported: darwin, win32, linux, all)")]
    UnsupportedPlatform(String),

    /// Required asset for a platform does not exist.
    #[error("missing {platform} asset: {path}")]
    MissingAsset {
        /// Platform the asset is required for
        platform: String,
        /// Expected location
        path: PathBuf,
    },

    /// External tool exited unsuccessfully.
    #[error(
        "{} failed ({}): {}{}",
        .step.description,
        exit_label(.code),
        .step.display_command(),
        stderr_suffix(.stderr_tail)
    )]
    StepFailed {
        /// Step that failed
        step: Box<CommandStep>,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Last lines written to stderr by the tool
        stderr_tail: Vec<String>,
    },

    /// External tool exceeded the configured step timeout.
    #[error("{description} timed out after {seconds}s")]
    StepTimedOut {
        /// Step description
        description: String,
        /// Configured timeout
        seconds: u64,
    },

    /// Build interrupted by the user.
    #[error("build cancelled")]
    Cancelled,

    /// Invalid glob pattern while locating artifacts.
    #[error("{0}")]
    GlobPattern(#[from] glob::PatternError),

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// True when this error (or the error it wraps) is a user cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Context(_, inner) => inner.is_cancelled(),
            _ => false,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn stderr_suffix(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!("\n{}", lines.join("\n"))
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with bundler's Error type.
/// Implemented for both [`Result`] and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::error::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation
//! that clap's declarative attributes cannot express.

use clap::Parser;
use std::path::PathBuf;

/// Multi-target packaging orchestrator for Electron applications
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_electron",
    version,
    about = "Multi-target packaging orchestrator for Electron applications",
    long_about = "Packages an Electron application directory for macOS (.app + .dmg), \
Windows (packaged .exe tree) and Linux (.deb + .rpm) by running the external \
packager and installer tools in order.

Usage:
  kodegen_bundler_electron
  kodegen_bundler_electron --platform linux --arch arm64
  kodegen_bundler_electron --platform darwin,win32 --continue-on-failure
  kodegen_bundler_electron --dry-run

Exit code 0 = every requested target built successfully."
)]
pub struct Args {
    /// Application source directory
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub app_dir: PathBuf,

    /// Platforms to build: darwin, win32, linux or all (comma separated)
    #[arg(
        short,
        long = "platform",
        value_name = "PLATFORMS",
        value_delimiter = ',',
        default_value = "all"
    )]
    pub platforms: Vec<String>,

    /// Architecture override (x64 or arm64); defaults to the host architecture
    #[arg(long, value_name = "ARCH", env = "KODEGEN_BUNDLE_ARCH")]
    pub arch: Option<String>,

    /// Keep building remaining targets after a target fails
    #[arg(long)]
    pub continue_on_failure: bool,

    /// Product name override (defaults to package.json productName/name)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Output directory (defaults to <app-dir>/build)
    #[arg(short = 'o', long = "out", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Config file (defaults to <app-dir>/bundle.toml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Kill any step running longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub step_timeout: Option<u64>,

    /// Write a JSON build report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Print the planned commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print extra detail
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.step_timeout == Some(0) {
            return Err("--step-timeout must be greater than zero".to_string());
        }

        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("--name cannot be empty".to_string());
        }

        if self.platforms.iter().all(|p| p.trim().is_empty()) {
            return Err("--platform needs at least one platform".to_string());
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) {
        let _ = self.output.warn(message);
    }
}

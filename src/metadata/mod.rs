//! Application metadata and bundle configuration discovery.
//!
//! Two optional files in the application directory feed [`Settings`](crate::bundler::Settings):
//!
//! - `package.json` - product name and version
//! - `bundle.toml` - output directory, icon paths, installer configs, tool
//!   names and build policy
//!
//! ```toml
//! [app]
//! name = "CopyCat"
//!
//! [output]
//! dir = "build"
//!
//! [icons]
//! linux = "assets/icon_Linux.png"
//!
//! [installers]
//! debian_config = "debian.json"
//! formats = ["deb"]
//!
//! [tools]
//! runner = "npx"
//!
//! [build]
//! continue_on_failure = true
//! step_timeout_secs = 1800
//! ```

use crate::bundler::{IconSettings, InstallerSettings, PackageSettings, ToolSettings};
use crate::error::{BundlerError, CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name looked up in the application directory.
pub const CONFIG_FILE_NAME: &str = "bundle.toml";

/// The fields of `package.json` this tool reads.
#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    name: Option<String>,
    #[serde(rename = "productName")]
    product_name: Option<String>,
    version: Option<String>,
}

/// `[app]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Product name override
    pub name: Option<String>,
    /// Version override
    pub version: Option<String>,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory, relative to the application directory
    pub dir: Option<PathBuf>,
}

/// `[build]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Keep building remaining targets after a failure
    pub continue_on_failure: Option<bool>,
    /// Kill steps running longer than this many seconds
    pub step_timeout_secs: Option<u64>,
}

/// Parsed `bundle.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Application metadata overrides
    pub app: AppConfig,
    /// Output location
    pub output: OutputConfig,
    /// Icon locations
    pub icons: IconSettings,
    /// Installer configuration
    pub installers: InstallerSettings,
    /// External tool names
    pub tools: ToolSettings,
    /// Build policy
    pub build: BuildConfig,
}

/// Reads application metadata from `<app_dir>/package.json`.
///
/// Returns `Ok(None)` when the file does not exist. The product name prefers
/// `productName` over `name`.
pub fn load_app_metadata(app_dir: &Path) -> Result<Option<PackageSettings>> {
    let manifest_path = app_dir.join("package.json");
    if !manifest_path.exists() {
        log::debug!("No package.json at {}", manifest_path.display());
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&manifest_path).map_err(|e| {
        BundlerError::Cli(CliError::InvalidConfig {
            path: manifest_path.clone(),
            reason: e.to_string(),
        })
    })?;

    let manifest: PackageJson = serde_json::from_str(&contents).map_err(|e| {
        BundlerError::Cli(CliError::InvalidConfig {
            path: manifest_path.clone(),
            reason: e.to_string(),
        })
    })?;

    let product_name = manifest
        .product_name
        .or(manifest.name)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_default();

    log::info!(
        "Read app metadata from {}: name={:?} version={:?}",
        manifest_path.display(),
        product_name,
        manifest.version
    );

    Ok(Some(PackageSettings {
        product_name,
        version: manifest.version,
    }))
}

/// Loads a `bundle.toml` file.
pub fn load_config(path: &Path) -> Result<BundleConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        BundlerError::Cli(CliError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    })?;

    let config: BundleConfig = toml::from_str(&contents)?;
    log::info!("Loaded bundle config from {}", path.display());
    Ok(config)
}

/// Loads the explicit config file, or `<app_dir>/bundle.toml` when present.
pub fn discover_config(app_dir: &Path, explicit: Option<&Path>) -> Result<BundleConfig> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let path = app_dir.join(CONFIG_FILE_NAME);
            if path.is_file() {
                load_config(&path)
            } else {
                log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, app_dir.display());
                Ok(BundleConfig::default())
            }
        }
    }
}

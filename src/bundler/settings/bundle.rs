//! Bundle configuration: icons, installer configs and external tool names.
//!
//! All three sections deserialize directly from `bundle.toml`; every field
//! has a default matching the conventional Electron project layout.

use crate::bundler::platform::{InstallerFormat, Platform};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Per-platform icon locations, relative to the application directory.
///
/// ```toml
/// [icons]
/// darwin = "assets/icon.icns"
/// win32 = "assets/icon.ico"
/// linux = "assets/icon_Linux.png"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct IconSettings {
    /// macOS `.icns` icon.
    pub darwin: PathBuf,
    /// Windows `.ico` icon.
    pub win32: PathBuf,
    /// Linux `.png` icon.
    pub linux: PathBuf,
}

impl Default for IconSettings {
    fn default() -> Self {
        Self {
            darwin: PathBuf::from("assets").join("icon.icns"),
            win32: PathBuf::from("assets").join("icon.ico"),
            linux: PathBuf::from("assets").join("icon_Linux.png"),
        }
    }
}

impl IconSettings {
    /// Icon path configured for `platform`.
    pub fn for_platform(&self, platform: Platform) -> &Path {
        match platform {
            Platform::Darwin => &self.darwin,
            Platform::Win32 => &self.win32,
            Platform::Linux => &self.linux,
        }
    }
}

/// Installer-format configuration.
///
/// The config files are handed to the installer tools untouched; this
/// crate never reads them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct InstallerSettings {
    /// Config passed to the Debian installer via `--config`.
    pub debian_config: PathBuf,

    /// Config passed to the Red Hat installer via `--config`.
    pub redhat_config: PathBuf,

    /// Restricts installer formats. `None` builds every format the
    /// platform supports; an empty list builds packaged apps only.
    pub formats: Option<BTreeSet<InstallerFormat>>,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            debian_config: PathBuf::from("debian.json"),
            redhat_config: PathBuf::from("redhat.json"),
            formats: None,
        }
    }
}

/// External tool names.
///
/// With the default `runner = "npx"` every step runs as
/// `npx <tool> <args...>`. Setting `runner = ""` invokes each tool directly.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Launcher prefixed to every tool, e.g. `npx`.
    pub runner: Option<String>,
    /// Packaging engine producing the platform-native app tree.
    pub packager: String,
    /// Disk image builder.
    pub dmg: String,
    /// Debian package builder.
    pub debian: String,
    /// Red Hat package builder.
    pub redhat: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            runner: Some("npx".to_string()),
            packager: "electron-packager".to_string(),
            dmg: "electron-installer-dmg".to_string(),
            debian: "electron-installer-debian".to_string(),
            redhat: "electron-installer-redhat".to_string(),
        }
    }
}

impl ToolSettings {
    /// Effective launcher; empty strings disable it.
    pub fn runner(&self) -> Option<&str> {
        self.runner.as_deref().filter(|r| !r.trim().is_empty())
    }

    /// Tool name used for an installer format.
    pub fn installer_tool(&self, format: InstallerFormat) -> &str {
        match format {
            InstallerFormat::Dmg => &self.dmg,
            InstallerFormat::Deb => &self.debian,
            InstallerFormat::Rpm => &self.redhat,
        }
    }
}

/// Bundle configuration for all platforms.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct BundleSettings {
    /// Icon locations.
    pub icons: IconSettings,
    /// Installer configuration.
    pub installers: InstallerSettings,
    /// External tool names.
    pub tools: ToolSettings,
}

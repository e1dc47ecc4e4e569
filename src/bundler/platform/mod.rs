//! Build targets and platform resolution.
//!
//! Decides which (platform, arch) pairs a run builds and what installer
//! formats each one carries. Resolution is pure: it never touches the
//! filesystem, so missing icons only surface later when a target is planned.

pub(crate) mod linux;
pub(crate) mod macos;

use crate::bundler::{Arch, Error, Result, Settings};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Operating system a target is packaged for.
///
/// Names follow the packager's `--platform` tokens.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS (.app + .dmg)
    Darwin,
    /// Windows (packaged .exe tree)
    Win32,
    /// Linux (.deb + .rpm)
    Linux,
}

impl Platform {
    /// Every supported platform in build order.
    pub const ALL: [Platform; 3] = [Platform::Darwin, Platform::Win32, Platform::Linux];

    /// Token used on the packager command line and in output directory names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Darwin => "darwin",
            Platform::Win32 => "win32",
            Platform::Linux => "linux",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Darwin => "macOS",
            Platform::Win32 => "Windows",
            Platform::Linux => "Linux",
        }
    }

    /// Installer formats produced after packaging.
    pub fn installer_formats(&self) -> BTreeSet<InstallerFormat> {
        match self {
            Platform::Darwin => BTreeSet::from([InstallerFormat::Dmg]),
            Platform::Win32 => BTreeSet::new(),
            Platform::Linux => BTreeSet::from([InstallerFormat::Deb, InstallerFormat::Rpm]),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "darwin" | "macos" | "mac" => Ok(Platform::Darwin),
            "win32" | "windows" | "win" => Ok(Platform::Win32),
            "linux" => Ok(Platform::Linux),
            _ => Err(Error::UnsupportedPlatform(s.to_string())),
        }
    }
}

/// Installer format built from a packaged app tree.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum InstallerFormat {
    /// macOS disk image
    Dmg,
    /// Debian package
    Deb,
    /// Red Hat package
    Rpm,
}

impl InstallerFormat {
    /// File extension of the produced installer.
    pub fn extension(&self) -> &'static str {
        match self {
            InstallerFormat::Dmg => "dmg",
            InstallerFormat::Deb => "deb",
            InstallerFormat::Rpm => "rpm",
        }
    }
}

impl fmt::Display for InstallerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One (platform, arch) combination to build.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BuildTarget {
    /// Target operating system
    pub platform: Platform,
    /// Target CPU architecture
    pub arch: Arch,
    /// Absolute icon path for this platform
    pub icon_path: PathBuf,
    /// Installer formats built after packaging, in build order
    pub installer_formats: BTreeSet<InstallerFormat>,
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.platform.label(), self.arch)
    }
}

/// Platforms requested for a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PlatformSelection {
    /// Every supported platform.
    #[default]
    All,
    /// A non-empty subset.
    Only(BTreeSet<Platform>),
}

impl PlatformSelection {
    /// Parses platform names; `all` anywhere in the list selects everything.
    ///
    /// # Errors
    ///
    /// Fails on an empty list or an unknown platform name.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut platforms = BTreeSet::new();
        let mut all = false;

        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if name.eq_ignore_ascii_case("all") {
                all = true;
            } else {
                platforms.insert(name.parse::<Platform>()?);
            }
        }

        if all {
            Ok(PlatformSelection::All)
        } else if platforms.is_empty() {
            Err(Error::GenericError(
                "at least one platform must be requested".to_string(),
            ))
        } else {
            Ok(PlatformSelection::Only(platforms))
        }
    }

    /// Selected platforms in build order.
    pub fn platforms(&self) -> Vec<Platform> {
        match self {
            PlatformSelection::All => Platform::ALL.to_vec(),
            PlatformSelection::Only(set) => Platform::ALL
                .into_iter()
                .filter(|p| set.contains(p))
                .collect(),
        }
    }
}

/// Resolves the targets to build.
///
/// `host_arch` is the host architecture string (or a user override); it must
/// map to exactly one supported [`Arch`]. Targets come back in build order
/// darwin, win32, linux, each with its conventional icon and the installer
/// formats left after the configured format filter.
///
/// # Errors
///
/// [`Error::UnsupportedArchitecture`] when `host_arch` is not x64 or arm64.
pub fn resolve_targets(
    host_arch: &str,
    requested: &PlatformSelection,
    settings: &Settings,
) -> Result<Vec<BuildTarget>> {
    let arch = Arch::parse(host_arch)?;
    let bundle = settings.bundle_settings();

    let targets = requested
        .platforms()
        .into_iter()
        .map(|platform| {
            let mut installer_formats = platform.installer_formats();
            if let Some(allowed) = &bundle.installers.formats {
                installer_formats.retain(|f| allowed.contains(f));
            }

            BuildTarget {
                platform,
                arch,
                icon_path: settings.resolve_app_path(bundle.icons.for_platform(platform)),
                installer_formats,
            }
        })
        .collect::<Vec<_>>();

    log::debug!(
        "Resolved {} target(s) for arch {}: {}",
        targets.len(),
        arch,
        targets
            .iter()
            .map(|t| t.platform.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(targets)
}

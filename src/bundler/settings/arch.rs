//! CPU architecture types and utilities.

use crate::bundler::{Error, Result};
use std::fmt;

/// CPU architecture of a build target.
///
/// Each installer tool names architectures differently, so the same value
/// renders through several accessors:
///
/// | Arch  | packager | Debian  | RPM      |
/// |-------|----------|---------|----------|
/// | X64   | `x64`    | `amd64` | `x86_64` |
/// | Arm64 | `arm64`  | `arm64` | `aarch64`|
///
/// # Examples
///
/// ```
/// use kodegen_bundler_electron::bundler::Arch;
///
/// let arch = Arch::parse("aarch64").unwrap();
/// assert_eq!(arch, Arch::Arm64);
/// assert_eq!(arch.rpm_name(), "aarch64");
/// ```
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// x86_64 / AMD64 (64-bit)
    X64,
    /// AArch64 / ARM64 (64-bit) - Apple Silicon, modern ARM devices
    Arm64,
}

impl Arch {
    /// Maps an architecture string onto a supported arch.
    ///
    /// Accepts packager, Rust and distro spellings. Anything else is an
    /// [`Error::UnsupportedArchitecture`].
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Ok(Arch::X64),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            _ => Err(Error::UnsupportedArchitecture(value.to_string())),
        }
    }

    /// Architecture of the running host.
    pub fn host() -> Result<Self> {
        Self::parse(std::env::consts::ARCH)
    }

    /// Token passed to the packager's `--arch` flag.
    pub fn packager_name(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        }
    }

    /// Debian package architecture.
    pub fn debian_name(&self) -> &'static str {
        match self {
            Arch::X64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }

    /// RPM package architecture.
    pub fn rpm_name(&self) -> &'static str {
        match self {
            Arch::X64 => "x86_64",
            Arch::Arm64 => "aarch64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.packager_name())
    }
}

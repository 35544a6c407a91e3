//! Normalize operating system and CPU architecture names into the platform
//! tags native resource folders are named after.
use std::env::consts;
use std::fmt::Display;

use super::error::StagingError;

/// The operating system family a native library is built for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Windows,
    Linux,
    Mac,
    /// Anything else, keeping the name that was reported
    Unsupported(String),
}

impl OsFamily {
    /// Classify an OS name by case-insensitive substring, checking for
    /// "win", "linux" and "mac" in that order.
    pub fn from_name(name: &str) -> Self {
        let lowered = name.to_lowercase();
        if lowered.contains("win") {
            Self::Windows
        } else if lowered.contains("linux") {
            Self::Linux
        } else if lowered.contains("mac") {
            Self::Mac
        } else {
            Self::Unsupported(name.to_string())
        }
    }

    /// The canonical tag used in resource folder names
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Mac => "mac",
            Self::Unsupported(_) => "unknown",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// The word width of the CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressWidth {
    Bits32,
    Bits64,
}

impl AddressWidth {
    /// Any architecture name ending in "64" is 64-bit, everything else is 32-bit
    pub fn from_arch(arch: &str) -> Self {
        if arch.ends_with("64") {
            Self::Bits64
        } else {
            Self::Bits32
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Bits32 => "32",
            Self::Bits64 => "64",
        }
    }
}

impl Display for AddressWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// An OS family and address width pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: OsFamily,
    pub width: AddressWidth,
}

impl Platform {
    pub fn new(os: OsFamily, width: AddressWidth) -> Self {
        Self { os, width }
    }

    pub fn from_names(os_name: &str, arch: &str) -> Self {
        Self::new(OsFamily::from_name(os_name), AddressWidth::from_arch(arch))
    }

    /// The platform this binary was compiled for
    pub fn current() -> Self {
        Self::from_names(consts::OS, consts::ARCH)
    }

    /// The name of the per-platform resource folder, e.g. `linux64`
    pub fn folder_name(&self) -> String {
        format!("{}{}", self.os.tag(), self.width.tag())
    }

    /// Fail with [`StagingError::UnsupportedPlatform`] unless the OS family is known
    pub fn require_supported(&self) -> Result<&Self, StagingError> {
        match &self.os {
            OsFamily::Unsupported(name) => Err(StagingError::UnsupportedPlatform(name.clone())),
            _ => Ok(self),
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.folder_name())
    }
}

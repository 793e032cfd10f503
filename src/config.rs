use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::UpdateError;

pub const ADOPTIUM_API: &str = "https://api.adoptium.net/v3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Mac,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Linux
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "linux" => Some(Platform::Linux),
            "mac" | "macos" => Some(Platform::Mac),
            "windows" | "win" => Some(Platform::Windows),
            _ => None,
        }
    }

    pub fn adoptium_os(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Mac => "mac",
            Platform::Windows => "windows",
        }
    }

    /// Directory name under `<root>/jdk` holding this platform's install.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Mac => "mac",
            Platform::Windows => "win",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X64,
    Aarch64,
}

impl Arch {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "x64" | "x86_64" => Some(Arch::X64),
            "aarch64" | "arm64" => Some(Arch::Aarch64),
            _ => None,
        }
    }

    pub fn adoptium_arch(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Aarch64 => "aarch64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Jdk,
}

impl ImageType {
    pub fn adoptium_name(&self) -> &'static str {
        match self {
            ImageType::Jdk => "jdk",
        }
    }
}

/// Only one release catalog provider is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Adoptium,
}

impl Vendor {
    pub fn parse(s: &str) -> Result<Self, UpdateError> {
        match s {
            "adoptium" => Ok(Vendor::Adoptium),
            other => Err(UpdateError::UnsupportedVendor(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Adoptium => "adoptium",
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstallTarget {
    pub platform: Platform,
    pub install_dir: PathBuf,
    pub arch: Arch,
    pub image_type: ImageType,
}

impl InstallTarget {
    pub fn new(platform: Platform, root: &Path) -> Self {
        Self {
            platform,
            install_dir: root.join("jdk").join(platform.dir_name()),
            arch: Arch::X64,
            image_type: ImageType::Jdk,
        }
    }

    pub fn with_arch(mut self, arch: Arch) -> Self {
        self.arch = arch;
        self
    }
}

/// Everything the updater needs from its environment, resolved by the caller.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    pub root: PathBuf,
    pub api_url: String,
    pub timeout: Duration,
}

impl UpdaterConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            api_url: ADOPTIUM_API.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn default_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("jdk-updater")
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.root.join("downloads")
    }
}

//! Target definitions - the platform/profile a module is resolved for.
//!
//! A `TargetInfo` is an equality-comparable key. Resolution never inspects it
//! beyond selecting conditional descriptor blocks and naming library binaries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The platform being built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// 64-bit Windows
    #[serde(alias = "windows")]
    Win64,

    /// 32-bit Windows
    Win32,

    /// Linux
    Linux,

    /// macOS
    #[serde(alias = "macos")]
    Mac,
}

impl Platform {
    /// Get the platform the current process runs on.
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            if cfg!(target_pointer_width = "32") {
                Platform::Win32
            } else {
                Platform::Win64
            }
        } else if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Linux
        }
    }

    /// Check if this is a Windows platform.
    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Win64 | Platform::Win32)
    }

    /// Get the static library file extension.
    pub fn static_lib_extension(&self) -> &'static str {
        if self.is_windows() {
            "lib"
        } else {
            "a"
        }
    }

    /// Get the static library file prefix.
    pub fn static_lib_prefix(&self) -> &'static str {
        if self.is_windows() {
            ""
        } else {
            "lib"
        }
    }

    /// Get the static library file name for a bare library stem.
    pub fn static_lib_filename(&self, stem: &str) -> String {
        format!(
            "{}{}.{}",
            self.static_lib_prefix(),
            stem,
            self.static_lib_extension()
        )
    }

    fn as_str(&self) -> &'static str {
        match self {
            Platform::Win64 => "win64",
            Platform::Win32 => "win32",
            Platform::Linux => "linux",
            Platform::Mac => "mac",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "win64" | "windows" => Ok(Platform::Win64),
            "win32" => Ok(Platform::Win32),
            "linux" => Ok(Platform::Linux),
            "mac" | "macos" => Ok(Platform::Mac),
            _ => Err(TargetParseError::UnknownPlatform(s.to_string())),
        }
    }
}

/// Build configuration (profile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Configuration {
    /// Unoptimized, debug libraries
    Debug,

    /// Optimized with development tooling
    #[default]
    Development,

    /// Fully optimized release
    #[serde(alias = "release")]
    Shipping,
}

impl Configuration {
    /// Check if debug library variants should be selected.
    pub fn is_debug(&self) -> bool {
        matches!(self, Configuration::Debug)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Configuration::Debug => "debug",
            Configuration::Development => "development",
            Configuration::Shipping => "shipping",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Configuration {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Configuration::Debug),
            "development" | "dev" => Ok(Configuration::Development),
            "shipping" | "release" => Ok(Configuration::Shipping),
            _ => Err(TargetParseError::UnknownConfiguration(s.to_string())),
        }
    }
}

/// Error parsing a target string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetParseError {
    #[error("unknown platform `{0}`; expected win64, win32, linux, or mac")]
    UnknownPlatform(String),

    #[error("unknown configuration `{0}`; expected debug, development, or shipping")]
    UnknownConfiguration(String),
}

/// The platform/profile context a resolution is performed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetInfo {
    pub platform: Platform,
    #[serde(default)]
    pub configuration: Configuration,
}

impl TargetInfo {
    /// Create a new target.
    pub fn new(platform: Platform, configuration: Configuration) -> Self {
        TargetInfo {
            platform,
            configuration,
        }
    }

    /// The host platform in the development configuration.
    pub fn host() -> Self {
        TargetInfo::new(Platform::host(), Configuration::Development)
    }
}

impl Default for TargetInfo {
    fn default() -> Self {
        TargetInfo::host()
    }
}

impl fmt::Display for TargetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.platform, self.configuration)
    }
}

/// Parses `<platform>[-<configuration>]`, e.g. `win64-debug` or `linux`.
impl FromStr for TargetInfo {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (platform, configuration) = match s.split_once('-') {
            Some((p, c)) => (p.parse()?, c.parse()?),
            None => (s.parse()?, Configuration::default()),
        };
        Ok(TargetInfo::new(platform, configuration))
    }
}

//! Configuration file support for modrules.
//!
//! Two configuration file locations are read:
//! - Global: `~/.modrules/config.toml` - User-wide defaults
//! - Project: `.modrules/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::target::TargetInfo;

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR: &str = ".modrules";

/// modrules configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Module catalog settings
    pub catalog: CatalogConfig,

    /// Resolution settings
    pub resolve: ResolveConfig,
}

/// Where module descriptors come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Glob patterns for descriptor files, relative to the project root.
    /// Empty means every `*.module.toml` under the root.
    pub descriptors: Vec<String>,

    /// Modules known by name only (engine modules without descriptors)
    pub opaque: Vec<String>,
}

/// Resolution defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Default target, e.g. `win64-development`
    pub target: Option<String>,

    /// Check resolved paths exist on disk
    pub verify_paths: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if !other.catalog.descriptors.is_empty() {
            self.catalog.descriptors = other.catalog.descriptors;
        }
        for name in other.catalog.opaque {
            if !self.catalog.opaque.contains(&name) {
                self.catalog.opaque.push(name);
            }
        }

        if other.resolve.target.is_some() {
            self.resolve.target = other.resolve.target;
        }
        if other.resolve.verify_paths {
            self.resolve.verify_paths = true;
        }
    }

    /// The configured default target, if any.
    pub fn target(&self) -> Result<Option<TargetInfo>> {
        self.resolve
            .target
            .as_deref()
            .map(|s| {
                s.parse::<TargetInfo>()
                    .with_context(|| format!("invalid `resolve.target` in config: `{}`", s))
            })
            .transpose()
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.modrules/config.toml)
/// 2. Global config (~/.modrules/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    // Project config overrides global
    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global config directory (~/.modrules).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the global config path (~/.modrules/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.modrules/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join("config.toml")
}

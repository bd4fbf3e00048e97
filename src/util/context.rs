//! Global context for modrules operations.
//!
//! Provides centralized access to the working directory, configuration
//! locations and output settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{self, Config, CONFIG_DIR};

/// Global context for one invocation.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    cwd: PathBuf,
    verbose: bool,
    color: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(GlobalContext {
            cwd,
            verbose: false,
            color: true,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = if cwd.is_absolute() {
            cwd
        } else {
            ctx.cwd.join(cwd)
        };
        Ok(ctx)
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// The project root: the nearest ancestor of the working directory
    /// holding a `.modrules` directory, else the working directory itself.
    /// The home directory is skipped since its `.modrules` is the global one.
    pub fn project_root(&self) -> PathBuf {
        let home = directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf());
        self.cwd
            .ancestors()
            .find(|dir| Some(*dir) != home.as_deref() && dir.join(CONFIG_DIR).is_dir())
            .unwrap_or(self.cwd.as_path())
            .to_path_buf()
    }

    /// Get the global config path (~/.modrules/config.toml).
    pub fn config_path(&self) -> Option<PathBuf> {
        config::global_config_path()
    }

    /// Load the merged global and project configuration.
    pub fn load_config(&self) -> Config {
        let project = config::project_config_path(&self.project_root());
        config::load_config(self.config_path().as_deref(), &project)
    }
}

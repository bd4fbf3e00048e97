//! Project loading: configuration plus module catalog.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::catalog::ModuleCatalog;
use crate::core::target::TargetInfo;
use crate::resolver::ResolveOptions;
use crate::util::config::Config;
use crate::util::GlobalContext;

/// A project root with its merged configuration and loaded catalog.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: Config,
    catalog: ModuleCatalog,
}

impl Project {
    /// Load the project the context points at.
    pub fn load(ctx: &GlobalContext) -> Result<Self> {
        Self::with_config(&ctx.project_root(), ctx.load_config())
    }

    /// Load the catalog under `root` using an explicit configuration.
    pub fn with_config(root: &Path, config: Config) -> Result<Self> {
        let catalog = ModuleCatalog::load(root, &config.catalog.descriptors)?
            .with_opaque(config.catalog.opaque.iter().cloned());

        tracing::debug!(
            "project at {} has {} modules ({} opaque)",
            root.display(),
            catalog.len(),
            config.catalog.opaque.len()
        );

        Ok(Project {
            root: root.to_path_buf(),
            config,
            catalog,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    /// The target to resolve for: the explicit one, else the configured
    /// default, else the host.
    pub fn target(&self, explicit: Option<TargetInfo>) -> Result<TargetInfo> {
        match explicit {
            Some(target) => Ok(target),
            None => Ok(self.config.target()?.unwrap_or_else(TargetInfo::host)),
        }
    }

    /// Resolution options, with `verify` forcing path checks on.
    pub fn resolve_options(&self, verify: bool) -> ResolveOptions {
        ResolveOptions {
            verify_paths: verify || self.config.resolve.verify_paths,
        }
    }
}

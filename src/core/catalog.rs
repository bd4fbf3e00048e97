//! Module catalog - every module known to a build.
//!
//! The catalog is loaded once and never mutated during resolution, so it can
//! be shared by reference across resolution threads.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::module::{DescriptorError, ModuleDescriptor};
use crate::core::schema::load_descriptor;
use crate::util::fs::glob_files;

/// File name suffix of module descriptors.
pub const DESCRIPTOR_SUFFIX: &str = ".module.toml";

/// Directories never searched for descriptors.
const SKIPPED_DIRS: &[&str] = &[".git", ".modrules", "target", "Binaries", "Intermediate"];

/// An immutable mapping from module name to descriptor.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    modules: BTreeMap<String, ModuleDescriptor>,
}

impl ModuleCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        ModuleCatalog::default()
    }

    /// Build a catalog from descriptors, rejecting duplicate names.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ModuleDescriptor>,
    ) -> Result<Self, DescriptorError> {
        let mut catalog = ModuleCatalog::new();
        for descriptor in descriptors {
            catalog.insert(descriptor)?;
        }
        Ok(catalog)
    }

    /// Add a descriptor after checking its dependency lists.
    pub fn insert(&mut self, descriptor: ModuleDescriptor) -> Result<(), DescriptorError> {
        descriptor.validate()?;
        if let Some(existing) = self.modules.get(descriptor.name()) {
            return Err(DescriptorError::DuplicateModule {
                name: descriptor.name().to_string(),
                first: existing.location().to_path_buf(),
                second: descriptor.location().to_path_buf(),
            });
        }
        self.modules
            .insert(descriptor.name().to_string(), descriptor);
        Ok(())
    }

    /// Register modules known by name only.
    ///
    /// Names that already have a descriptor are left alone.
    pub fn with_opaque(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for name in names {
            let name = name.into();
            self.modules
                .entry(name.clone())
                .or_insert_with(|| ModuleDescriptor::opaque(name));
        }
        self
    }

    /// Load every descriptor under `root`.
    ///
    /// With no patterns, the tree is walked for `*.module.toml` files.
    /// Otherwise the glob patterns (relative to `root`) select the files.
    pub fn load(root: &Path, patterns: &[String]) -> Result<Self> {
        let files = if patterns.is_empty() {
            discover_descriptors(root)
        } else {
            glob_files(root, patterns)?
        };

        let mut catalog = ModuleCatalog::new();
        for file in &files {
            let descriptor = load_descriptor(file)?;
            tracing::debug!(
                "loaded module `{}` ({}) from {}",
                descriptor.name(),
                descriptor.schema(),
                file.display()
            );
            catalog
                .insert(descriptor)
                .with_context(|| format!("while loading {}", file.display()))?;
        }

        tracing::info!(
            "loaded {} module descriptor(s) from {}",
            catalog.len(),
            root.display()
        );
        Ok(catalog)
    }

    /// Get a module by name.
    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(name)
    }

    /// Check if a module is present.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Iterate over module names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Iterate over descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Names that look like a misspelling of `name`.
    pub fn similar_names(&self, name: &str) -> Vec<String> {
        let needle = name.to_lowercase();
        self.names()
            .filter(|candidate| {
                let candidate = candidate.to_lowercase();
                candidate == needle || candidate.contains(&needle) || needle.contains(&candidate)
            })
            .map(str::to_string)
            .collect()
    }
}

fn discover_descriptors(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIPPED_DIRS.contains(&name)))
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(DESCRIPTOR_SUFFIX))
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

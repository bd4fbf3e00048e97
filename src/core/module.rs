//! Module descriptors - what a module declares.
//!
//! A `ModuleDescriptor` is the normalized form of every on-disk schema
//! revision. Resolution only ever sees this type, asking it for the concrete
//! `ModuleRules` of one target.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::target::{Configuration, Platform, TargetInfo};
use crate::core::third_party::ThirdPartyLibrary;

/// Errors raised while normalizing a descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("module `{module}` lists itself as a dependency")]
    SelfDependency { module: String },

    #[error("module `{module}` lists dependency `{dependency}` more than once")]
    DuplicateDependency { module: String, dependency: String },

    #[error("module `{module}` uses legacy schema but third-party library `{library}` has no stored path")]
    MissingLegacyPath { module: String, library: String },

    #[error("module `{module}` declares `{field}`, which schema {schema} does not support")]
    UnsupportedField {
        module: String,
        schema: SchemaVersion,
        field: &'static str,
    },

    #[error("module `{name}` is declared twice: {first} and {second}")]
    DuplicateModule {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("failed to parse descriptor {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to read descriptor {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Descriptor schema revisions observed in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Stored absolute third-party paths
    V1,
    /// Third-party paths derived from the module location
    V2,
    /// Derived paths plus module include paths and conditional blocks
    V3,
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaVersion::V1 => write!(f, "v1"),
            SchemaVersion::V2 => write!(f, "v2"),
            SchemaVersion::V3 => write!(f, "v3"),
        }
    }
}

/// The lists a module declares, before or after target selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    /// Dependencies whose includes propagate to this module's dependents
    pub public_dependencies: Vec<String>,

    /// Dependencies visible only to this module
    pub private_dependencies: Vec<String>,

    /// Include paths exported to dependents
    pub public_include_paths: Vec<PathBuf>,

    /// Include paths used only when compiling this module
    pub private_include_paths: Vec<PathBuf>,

    /// Modules whose public include paths this module sees without depending on them
    pub private_include_path_modules: Vec<String>,

    /// Extra library files linked by anything reaching this module
    pub additional_libraries: Vec<PathBuf>,

    /// Prebuilt third-party libraries
    pub third_party: Vec<ThirdPartyLibrary>,
}

impl RuleSet {
    /// Append another rule set, skipping entries already present.
    fn extend_unique(&mut self, other: &RuleSet) {
        push_unique(&mut self.public_dependencies, &other.public_dependencies);
        push_unique(&mut self.private_dependencies, &other.private_dependencies);
        push_unique(&mut self.public_include_paths, &other.public_include_paths);
        push_unique(&mut self.private_include_paths, &other.private_include_paths);
        push_unique(
            &mut self.private_include_path_modules,
            &other.private_include_path_modules,
        );
        push_unique(&mut self.additional_libraries, &other.additional_libraries);
        push_unique(&mut self.third_party, &other.third_party);
    }

    /// All declared dependency names, public first, in declaration order.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.public_dependencies
            .iter()
            .chain(&self.private_dependencies)
            .map(String::as_str)
    }

    fn validate(&self, module: &str) -> Result<(), DescriptorError> {
        let mut seen = HashSet::new();
        for dep in self.dependencies() {
            if dep == module {
                return Err(DescriptorError::SelfDependency {
                    module: module.to_string(),
                });
            }
            if !seen.insert(dep) {
                return Err(DescriptorError::DuplicateDependency {
                    module: module.to_string(),
                    dependency: dep.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn push_unique<T: Clone + PartialEq>(dst: &mut Vec<T>, src: &[T]) {
    for item in src {
        if !dst.contains(item) {
            dst.push(item.clone());
        }
    }
}

/// Selects the targets a conditional block applies to.
///
/// An absent selector matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFilter {
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub configuration: Option<Configuration>,
}

impl TargetFilter {
    /// Check if this filter selects the given target.
    pub fn matches(&self, target: &TargetInfo) -> bool {
        self.platform.map_or(true, |p| p == target.platform)
            && self
                .configuration
                .map_or(true, |c| c == target.configuration)
    }
}

/// Extra rules applied only for matching targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalRules {
    pub filter: TargetFilter,
    pub rules: RuleSet,
}

/// The normalized, target-parameterized declaration of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    name: String,
    location: PathBuf,
    schema: SchemaVersion,
    base: RuleSet,
    conditionals: Vec<ConditionalRules>,
}

impl ModuleDescriptor {
    /// Create an empty descriptor for a module located in `location`.
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        ModuleDescriptor {
            name: name.into(),
            location: location.into(),
            schema: SchemaVersion::V3,
            base: RuleSet::default(),
            conditionals: Vec::new(),
        }
    }

    /// Create a descriptor for a module known by name only.
    ///
    /// Engine modules are opaque: they declare nothing and have no location.
    pub fn opaque(name: impl Into<String>) -> Self {
        ModuleDescriptor::new(name, PathBuf::new())
    }

    /// Assemble a descriptor from already-normalized parts, validating it.
    pub fn from_parts(
        name: impl Into<String>,
        location: impl Into<PathBuf>,
        schema: SchemaVersion,
        base: RuleSet,
        conditionals: Vec<ConditionalRules>,
    ) -> Result<Self, DescriptorError> {
        let descriptor = ModuleDescriptor {
            name: name.into(),
            location: location.into(),
            schema,
            base,
            conditionals,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check the no-self-dependency and no-duplicate invariants.
    ///
    /// The base rules are checked alone and together with each conditional
    /// block. Overlap between two conditional blocks is merged away by
    /// `rules_for`.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        self.base.validate(&self.name)?;
        for cond in &self.conditionals {
            let mut merged = self.base.clone();
            merged.public_dependencies.extend(cond.rules.public_dependencies.iter().cloned());
            merged.private_dependencies.extend(cond.rules.private_dependencies.iter().cloned());
            merged.validate(&self.name)?;
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The directory the module's descriptor lives in.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Check if this module is known by name only.
    pub fn is_opaque(&self) -> bool {
        self.location.as_os_str().is_empty()
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    /// The unconditional rules.
    pub fn base(&self) -> &RuleSet {
        &self.base
    }

    pub fn conditionals(&self) -> &[ConditionalRules] {
        &self.conditionals
    }

    /// Add public dependencies.
    pub fn with_public_deps(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.base.public_dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Add private dependencies.
    pub fn with_private_deps(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.base.private_dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Add public include paths.
    pub fn with_public_includes(
        mut self,
        paths: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        self.base.public_include_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Add private include paths.
    pub fn with_private_includes(
        mut self,
        paths: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        self.base.private_include_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Add modules whose public includes are visible without a dependency.
    pub fn with_private_include_path_modules(
        mut self,
        names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.base
            .private_include_path_modules
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Add extra link libraries.
    pub fn with_additional_libraries(
        mut self,
        libs: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        self.base.additional_libraries.extend(libs.into_iter().map(Into::into));
        self
    }

    /// Add a third-party library.
    pub fn with_third_party(mut self, lib: ThirdPartyLibrary) -> Self {
        self.base.third_party.push(lib);
        self
    }

    /// Add a conditional block.
    pub fn with_conditional(mut self, filter: TargetFilter, rules: RuleSet) -> Self {
        self.conditionals.push(ConditionalRules { filter, rules });
        self
    }

    /// Get the concrete rules for a target.
    pub fn rules_for(&self, target: &TargetInfo) -> ModuleRules<'_> {
        let mut rules = self.base.clone();
        for cond in self.conditionals.iter().filter(|c| c.filter.matches(target)) {
            rules.extend_unique(&cond.rules);
        }
        ModuleRules {
            descriptor: self,
            rules,
        }
    }
}

/// A module's rules for one target.
#[derive(Debug, Clone)]
pub struct ModuleRules<'a> {
    descriptor: &'a ModuleDescriptor,
    rules: RuleSet,
}

impl<'a> ModuleRules<'a> {
    pub fn name(&self) -> &'a str {
        &self.descriptor.name
    }

    pub fn location(&self) -> &'a Path {
        &self.descriptor.location
    }

    pub fn public_dependencies(&self) -> &[String] {
        &self.rules.public_dependencies
    }

    pub fn private_dependencies(&self) -> &[String] {
        &self.rules.private_dependencies
    }

    pub fn public_include_paths(&self) -> &[PathBuf] {
        &self.rules.public_include_paths
    }

    pub fn private_include_paths(&self) -> &[PathBuf] {
        &self.rules.private_include_paths
    }

    pub fn private_include_path_modules(&self) -> &[String] {
        &self.rules.private_include_path_modules
    }

    pub fn additional_libraries(&self) -> &[PathBuf] {
        &self.rules.additional_libraries
    }

    pub fn third_party(&self) -> &[ThirdPartyLibrary] {
        &self.rules.third_party
    }
}

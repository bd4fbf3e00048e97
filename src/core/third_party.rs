//! Third-party library references.
//!
//! A third-party library is a prebuilt external library shipped next to the
//! modules that use it. Its root directory is either derived from the owning
//! module's location or, for legacy descriptors, stored verbatim.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::target::TargetInfo;

/// Directory name third-party libraries live under, next to the module directory.
pub const THIRD_PARTY_DIR: &str = "ThirdParty";

/// How a path was materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Third-party root computed from the module location
    Derived,
    /// Third-party root read from a stored absolute path
    Legacy,
    /// Path relative to the module's own directory
    Module,
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionMode::Derived => write!(f, "derived"),
            ResolutionMode::Legacy => write!(f, "legacy"),
            ResolutionMode::Module => write!(f, "module-relative"),
        }
    }
}

/// Where a third-party library's root directory comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThirdPartyRoot {
    /// `<module>/../ThirdParty/<name>`
    Derived,
    /// A stored path, retained for older descriptors.
    Legacy(PathBuf),
}

impl ThirdPartyRoot {
    /// The resolution mode this root is resolved with.
    pub fn mode(&self) -> ResolutionMode {
        match self {
            ThirdPartyRoot::Derived => ResolutionMode::Derived,
            ThirdPartyRoot::Legacy(_) => ResolutionMode::Legacy,
        }
    }
}

/// A prebuilt library referenced by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThirdPartyLibrary {
    /// Logical name, also the directory name in derived mode
    pub name: String,

    /// Root directory source
    pub root: ThirdPartyRoot,

    /// Include subdirectory, relative to the root
    pub include_dir: PathBuf,

    /// Library subdirectory, relative to the root
    pub lib_dir: PathBuf,

    /// Binary file name. A bare stem gets the target's static library naming.
    pub binary: String,

    /// Binary used for debug configurations, if different
    pub debug_binary: Option<String>,
}

impl ThirdPartyLibrary {
    /// Create a library with a derived root and the conventional
    /// `include`/`lib` layout.
    pub fn new(name: impl Into<String>, binary: impl Into<String>) -> Self {
        ThirdPartyLibrary {
            name: name.into(),
            root: ThirdPartyRoot::Derived,
            include_dir: PathBuf::from("include"),
            lib_dir: PathBuf::from("lib"),
            binary: binary.into(),
            debug_binary: None,
        }
    }

    /// Use a stored legacy root instead of deriving it.
    pub fn with_legacy_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = ThirdPartyRoot::Legacy(root.into());
        self
    }

    /// Set the include subdirectory.
    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dir = dir.into();
        self
    }

    /// Set the library subdirectory.
    pub fn with_lib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lib_dir = dir.into();
        self
    }

    /// Set the debug binary.
    pub fn with_debug_binary(mut self, binary: impl Into<String>) -> Self {
        self.debug_binary = Some(binary.into());
        self
    }

    /// Get the binary file name for a target.
    pub fn binary_for(&self, target: &TargetInfo) -> String {
        let binary = match (&self.debug_binary, target.configuration.is_debug()) {
            (Some(debug), true) => debug,
            _ => &self.binary,
        };

        if Path::new(binary).extension().is_some() {
            binary.clone()
        } else {
            target.platform.static_lib_filename(binary)
        }
    }
}

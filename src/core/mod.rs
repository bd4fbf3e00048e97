//! Core data structures for modrules.
//!
//! This module contains the foundational types used throughout the crate:
//! - Targets (platform and configuration)
//! - Third-party library declarations
//! - Module descriptors and their on-disk schemas
//! - The module catalog

pub mod catalog;
pub mod module;
pub mod schema;
pub mod target;
pub mod third_party;

pub use catalog::ModuleCatalog;
pub use module::{DescriptorError, ModuleDescriptor, ModuleRules, SchemaVersion};
pub use schema::{load_descriptor, parse_descriptor};
pub use target::{Configuration, Platform, TargetInfo};
pub use third_party::{ResolutionMode, ThirdPartyLibrary, ThirdPartyRoot};

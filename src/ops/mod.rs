//! High-level operations.
//!
//! This module contains the implementation of modrules commands.

pub mod check;
pub mod project;
pub mod resolve;

pub use check::{check_catalog, CheckFailure, CheckReport};
pub use project::Project;
pub use resolve::{resolve_batch, resolve_module, ModuleResolution, ResolveRequest};

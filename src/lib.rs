//! modrules - module rules and dependency resolution for engine-style builds
//!
//! This crate reads per-module descriptors, resolves a root module's
//! transitive dependency closure for a target, and flattens it into the
//! include directories and link libraries an external compiler driver needs.

pub mod core;
pub mod emit;
pub mod ops;
pub mod paths;
pub mod resolver;
pub mod util;

/// Catalog fixtures for unit tests.
///
/// This module is only available when compiling with `--cfg test`.
#[cfg(test)]
pub mod test_support;

pub use core::{
    catalog::ModuleCatalog, module::ModuleDescriptor, target::TargetInfo,
    third_party::ThirdPartyLibrary,
};
pub use emit::{emit, EmittedConfiguration};
pub use resolver::{resolve, ResolveError, ResolveOptions, ResolvedConfiguration};
pub use util::context::GlobalContext;

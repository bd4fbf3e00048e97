//! Dependency resolution.
//!
//! Resolution is pure and deterministic: the catalog is loaded before any
//! request, and a request only touches the filesystem when path verification
//! is switched on.

pub mod errors;
pub mod graph;
pub mod resolve;

pub use errors::ResolveError;
pub use graph::{DependencyGraph, Visibility};
pub use resolve::{resolve, ResolveOptions, ResolvedConfiguration};

//! Module resolution operations.

use rayon::prelude::*;
use serde::Serialize;

use crate::core::catalog::ModuleCatalog;
use crate::core::target::TargetInfo;
use crate::emit::{emit, EmittedConfiguration};
use crate::resolver::{resolve, ResolveError, ResolveOptions, ResolvedConfiguration};

/// A resolution and its flattened output.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleResolution {
    pub resolved: ResolvedConfiguration,
    pub emitted: EmittedConfiguration,
}

/// One (root module, target) pair to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolveRequest {
    pub module: String,
    pub target: TargetInfo,
}

impl ResolveRequest {
    pub fn new(module: impl Into<String>, target: TargetInfo) -> Self {
        ResolveRequest {
            module: module.into(),
            target,
        }
    }
}

/// Resolve one root module for one target and flatten the result.
pub fn resolve_module(
    catalog: &ModuleCatalog,
    module: &str,
    target: &TargetInfo,
    options: ResolveOptions,
) -> Result<ModuleResolution, ResolveError> {
    let resolved = resolve(module, target, catalog, options)?;
    let emitted = emit(&resolved);

    tracing::debug!(
        "resolved `{}` for {}: {} include dirs, {} link libraries",
        module,
        target,
        emitted.include_dirs.len(),
        emitted.link_libraries.len()
    );

    Ok(ModuleResolution { resolved, emitted })
}

/// Resolve many requests in parallel against a shared catalog.
///
/// Every request runs to completion independently; results are returned in
/// request order.
pub fn resolve_batch(
    catalog: &ModuleCatalog,
    requests: &[ResolveRequest],
    options: ResolveOptions,
) -> Vec<Result<ModuleResolution, ResolveError>> {
    tracing::info!("Resolving {} module/target pairs", requests.len());

    requests
        .par_iter()
        .map(|request| resolve_module(catalog, &request.module, &request.target, options))
        .collect()
}

//! Catalog-wide checking: resolve every module for every target.

use std::collections::HashSet;

use crate::core::catalog::ModuleCatalog;
use crate::core::target::TargetInfo;
use crate::ops::resolve::{resolve_batch, ResolveRequest};
use crate::resolver::{ResolveError, ResolveOptions};
use crate::util::diagnostic::Diagnostic;

/// A request that failed.
#[derive(Debug, Clone)]
pub struct CheckFailure {
    pub request: ResolveRequest,
    pub error: ResolveError,
}

/// Outcome of checking a catalog.
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Number of requests resolved
    pub checked: usize,
    /// Failed requests, in request order
    pub failures: Vec<CheckFailure>,
    /// Distinct warnings across all successful requests
    pub warnings: Vec<Diagnostic>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolve every non-opaque module in the catalog for each target.
pub fn check_catalog(
    catalog: &ModuleCatalog,
    targets: &[TargetInfo],
    options: ResolveOptions,
) -> CheckReport {
    let requests: Vec<ResolveRequest> = catalog
        .iter()
        .filter(|descriptor| !descriptor.is_opaque())
        .flat_map(|descriptor| {
            targets
                .iter()
                .map(move |target| ResolveRequest::new(descriptor.name(), *target))
        })
        .collect();

    let results = resolve_batch(catalog, &requests, options);

    let mut report = CheckReport {
        checked: requests.len(),
        ..CheckReport::default()
    };
    let mut seen = HashSet::new();

    for (request, result) in requests.into_iter().zip(results) {
        match result {
            Ok(resolution) => {
                for diagnostic in resolution.resolved.diagnostics {
                    if seen.insert(diagnostic.clone()) {
                        report.warnings.push(diagnostic);
                    }
                }
            }
            Err(error) => {
                tracing::debug!("`{}` failed for {}: {}", request.module, request.target, error);
                report.failures.push(CheckFailure { request, error });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::module::ModuleDescriptor;
    use crate::core::target::{Configuration, Platform};
    use crate::test_support::*;

    #[test]
    fn test_clean_catalog_passes() {
        let targets = [win64(), TargetInfo::new(Platform::Linux, Configuration::Debug)];
        let report = check_catalog(&game_catalog(), &targets, ResolveOptions::default());

        assert!(report.is_ok());
        // GameAlpha and CustomMeshComponent, engine modules are opaque
        assert_eq!(report.checked, 4);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_failures_and_deduplicated_warnings() {
        let catalog = ModuleCatalog::from_descriptors([
            ModuleDescriptor::new("Legacy", module_dir("Legacy"))
                .with_third_party(libnoise().with_legacy_root("/opt/LibNoise")),
            ModuleDescriptor::new("UsesLegacy", module_dir("UsesLegacy"))
                .with_public_deps(["Legacy"]),
            ModuleDescriptor::new("Loop", module_dir("Loop")).with_public_deps(["Loop2"]),
            ModuleDescriptor::new("Loop2", module_dir("Loop2")).with_private_deps(["Loop"]),
        ])
        .unwrap();

        let report = check_catalog(&catalog, &[win64()], ResolveOptions::default());

        assert!(!report.is_ok());
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| matches!(f.error, ResolveError::CyclicDependency { .. })));
        // Same legacy warning from both roots, reported once
        assert_eq!(report.warnings.len(), 1);
    }
}

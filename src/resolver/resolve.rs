//! Resolution of one root module for one target.
//!
//! `resolve` builds a fresh `DependencyGraph`, walks the modules visible to
//! the root and collects their include paths and libraries. The graph is
//! dropped afterwards; nothing is cached across targets.

use std::collections::HashSet;
use std::hash::Hash;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::catalog::ModuleCatalog;
use crate::core::target::TargetInfo;
use crate::paths::{
    resolve_module_path, resolve_third_party, verify_all, ResolvedPath, ResolvedThirdParty,
};
use crate::resolver::errors::ResolveError;
use crate::resolver::graph::DependencyGraph;
use crate::util::diagnostic::{codes, Diagnostic};

/// Options controlling a resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Check every materialized path exists on disk
    pub verify_paths: bool,
}

/// Everything a root module sees for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfiguration {
    /// Root module
    pub root: String,
    /// Target resolved for
    pub target: TargetInfo,
    /// Modules visible to the root, root first, breadth-first
    pub modules: Vec<String>,
    /// Module include directories, deduplicated, in resolution order
    pub include_dirs: Vec<PathBuf>,
    /// Additional link libraries declared by visible modules
    pub additional_libraries: Vec<PathBuf>,
    /// Third-party libraries, deduplicated by name, first seen wins
    pub third_party: Vec<ResolvedThirdParty>,
    /// Non-fatal diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

/// Order-preserving set.
#[derive(Debug)]
struct OrderedSet<T> {
    seen: HashSet<T>,
    items: Vec<T>,
}

impl<T: Clone + Eq + Hash> OrderedSet<T> {
    fn new() -> Self {
        OrderedSet {
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }

    fn insert(&mut self, item: T) {
        if self.seen.insert(item.clone()) {
            self.items.push(item);
        }
    }

    fn into_vec(self) -> Vec<T> {
        self.items
    }
}

/// Resolve `root` for `target` against `catalog`.
///
/// Include directories are collected in this order: the root's public then
/// private include paths, the public include paths of every other visible
/// module, then the public include paths of the root's include-only modules.
/// Fails fast; no partial configuration is returned.
pub fn resolve(
    root: &str,
    target: &TargetInfo,
    catalog: &ModuleCatalog,
    options: ResolveOptions,
) -> Result<ResolvedConfiguration, ResolveError> {
    let graph = DependencyGraph::build(root, target, catalog)?;
    let visible = graph.visible_modules();

    let mut include_dirs: OrderedSet<ResolvedPath> = OrderedSet::new();
    let mut additional_libraries: OrderedSet<ResolvedPath> = OrderedSet::new();
    let mut third_party: Vec<ResolvedThirdParty> = Vec::new();
    let mut diagnostics = Vec::new();

    for (depth, name) in visible.iter().enumerate() {
        let Some(descriptor) = catalog.get(name) else {
            continue;
        };
        let rules = descriptor.rules_for(target);
        let location = rules.location();

        for include in rules.public_include_paths() {
            include_dirs.insert(resolve_module_path(location, include));
        }

        if depth == 0 {
            for include in rules.private_include_paths() {
                include_dirs.insert(resolve_module_path(location, include));
            }
        }

        for lib in rules.additional_libraries() {
            additional_libraries.insert(resolve_module_path(location, lib));
        }

        for lib in rules.third_party() {
            let (resolved, diagnostic) = resolve_third_party(name, location, lib, target);
            diagnostics.extend(diagnostic);

            match third_party.iter().find(|existing| existing.name == resolved.name) {
                Some(existing) if existing.conflicts_with(&resolved) => {
                    tracing::warn!(
                        "third-party library `{}` defined differently by `{}` and `{}`; using `{}`",
                        resolved.name,
                        existing.declared_by,
                        resolved.declared_by,
                        existing.declared_by
                    );
                    diagnostics.push(conflict_diagnostic(existing, &resolved));
                }
                Some(_) => {}
                None => third_party.push(resolved),
            }
        }

        tracing::debug!("collected module `{}` for `{}`", name, root);
    }

    if let Some(descriptor) = catalog.get(root) {
        let rules = descriptor.rules_for(target);
        for include_module in rules.private_include_path_modules() {
            let Some(other) = catalog.get(include_module) else {
                continue;
            };
            let other_rules = other.rules_for(target);
            for include in other_rules.public_include_paths() {
                include_dirs.insert(resolve_module_path(other_rules.location(), include));
            }
        }
    }

    let include_dirs = include_dirs.into_vec();
    let additional_libraries = additional_libraries.into_vec();

    if options.verify_paths {
        let library_paths: Vec<ResolvedPath> = third_party
            .iter()
            .flat_map(|lib| lib.verifiable_paths())
            .collect();
        verify_all(
            include_dirs
                .iter()
                .chain(&additional_libraries)
                .chain(&library_paths),
        )?;
    }

    Ok(ResolvedConfiguration {
        root: graph.root().to_string(),
        target: *target,
        modules: visible.iter().map(|m| m.to_string()).collect(),
        include_dirs: include_dirs.into_iter().map(|p| p.path).collect(),
        additional_libraries: additional_libraries.into_iter().map(|p| p.path).collect(),
        third_party,
        diagnostics,
    })
}

fn conflict_diagnostic(kept: &ResolvedThirdParty, ignored: &ResolvedThirdParty) -> Diagnostic {
    Diagnostic::warning(format!(
        "conflicting definitions of third-party library `{}`",
        kept.name
    ))
    .with_code(codes::CONFLICTING_THIRD_PARTY)
    .with_context(format!(
        "`{}` defines it at {} (used)",
        kept.declared_by,
        kept.root.display()
    ))
    .with_context(format!(
        "`{}` defines it at {} (ignored)",
        ignored.declared_by,
        ignored.root.display()
    ))
    .with_suggestion("declare the library in one module and depend on that module publicly")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::module::ModuleDescriptor;
    use crate::core::third_party::{ResolutionMode, ThirdPartyLibrary};
    use crate::test_support::*;
    use tempfile::TempDir;

    fn catalog(modules: Vec<ModuleDescriptor>) -> ModuleCatalog {
        ModuleCatalog::from_descriptors(modules).unwrap()
    }

    fn resolve_ok(root: &str, catalog: &ModuleCatalog) -> ResolvedConfiguration {
        resolve(root, &win64(), catalog, ResolveOptions::default()).unwrap()
    }

    #[test]
    fn test_root_with_engine_and_libnoise() {
        let catalog = catalog(vec![
            ModuleDescriptor::new("Root", module_dir("Root"))
                .with_public_deps(["Engine"])
                .with_third_party(libnoise()),
            ModuleDescriptor::new("Engine", module_dir("Engine")),
        ]);

        let resolved = resolve_ok("Root", &catalog);
        assert!(resolved.include_dirs.is_empty());
        assert_eq!(resolved.third_party.len(), 1);
        assert_eq!(
            resolved.third_party[0].include_dir,
            PathBuf::from("/work/GameAlpha/Source/ThirdParty/LibNoise/src")
        );
        assert_eq!(
            resolved.third_party[0].binary,
            PathBuf::from("/work/GameAlpha/Source/ThirdParty/LibNoise/lib/libnoise.lib")
        );
        assert!(resolved.diagnostics.is_empty());
        assert_eq!(resolved.modules, vec!["Root", "Engine"]);
    }

    #[test]
    fn test_game_module_sees_include_path_module() {
        let resolved = resolve_ok("GameAlpha", &game_catalog());

        assert_eq!(
            resolved.include_dirs,
            vec![module_dir("CustomMeshComponent").join("Public")]
        );
        assert_eq!(
            resolved.modules,
            vec![
                "GameAlpha",
                "Core",
                "CoreUObject",
                "Engine",
                "InputCore",
                "CustomMeshComponent"
            ]
        );
    }

    #[test]
    fn test_include_path_module_is_not_traversed() {
        let catalog = catalog(vec![
            ModuleDescriptor::new("Root", module_dir("Root"))
                .with_private_include_path_modules(["Mesh"]),
            ModuleDescriptor::new("Mesh", module_dir("Mesh"))
                .with_public_includes(["Public"])
                .with_public_deps(["Renderer"])
                .with_third_party(ThirdPartyLibrary::new("MeshOpt", "meshopt")),
            ModuleDescriptor::new("Renderer", module_dir("Renderer")).with_public_includes(["Public"]),
        ]);

        let resolved = resolve_ok("Root", &catalog);
        assert_eq!(resolved.include_dirs, vec![module_dir("Mesh").join("Public")]);
        assert!(resolved.third_party.is_empty());
        assert_eq!(resolved.modules, vec!["Root"]);
    }

    #[test]
    fn test_root_private_includes_kept_dependency_private_includes_dropped() {
        let catalog = catalog(vec![
            ModuleDescriptor::new("Root", module_dir("Root"))
                .with_public_includes(["Public"])
                .with_private_includes(["Private"])
                .with_public_deps(["Lib"]),
            ModuleDescriptor::new("Lib", module_dir("Lib"))
                .with_public_includes(["Public"])
                .with_private_includes(["Private"]),
        ]);

        let resolved = resolve_ok("Root", &catalog);
        assert_eq!(
            resolved.include_dirs,
            vec![
                module_dir("Root").join("Public"),
                module_dir("Root").join("Private"),
                module_dir("Lib").join("Public"),
            ]
        );
    }

    #[test]
    fn test_private_dependency_invisible_to_dependents() {
        let catalog = catalog(vec![
            ModuleDescriptor::new("App", module_dir("App")).with_public_deps(["Mid"]),
            ModuleDescriptor::new("Mid", module_dir("Mid"))
                .with_public_includes(["Public"])
                .with_private_deps(["Secret"]),
            ModuleDescriptor::new("Secret", module_dir("Secret"))
                .with_public_includes(["Public"])
                .with_third_party(ThirdPartyLibrary::new("Zlib", "z")),
        ]);

        let app = resolve_ok("App", &catalog);
        assert!(!app
            .include_dirs
            .contains(&module_dir("Secret").join("Public")));
        assert!(app.third_party.is_empty());
        assert!(!app.modules.contains(&"Secret".to_string()));

        let mid = resolve_ok("Mid", &catalog);
        assert!(mid.include_dirs.contains(&module_dir("Secret").join("Public")));
        assert_eq!(mid.third_party[0].name, "Zlib");
    }

    #[test]
    fn test_public_includes_propagate_along_any_chain_length() {
        let catalog = public_chain(12);
        let resolved = resolve_ok("M0", &catalog);

        assert_eq!(resolved.include_dirs.len(), 12);
        assert_eq!(
            resolved.include_dirs.last(),
            Some(&module_dir("M11").join("Public"))
        );
    }

    #[test]
    fn test_diamond_yields_no_duplicates() {
        let catalog = catalog(vec![
            ModuleDescriptor::new("Root", module_dir("Root")).with_public_deps(["A", "B"]),
            ModuleDescriptor::new("A", module_dir("A"))
                .with_public_deps(["Shared"])
                .with_third_party(libnoise()),
            ModuleDescriptor::new("B", module_dir("B"))
                .with_public_deps(["Shared"])
                .with_third_party(libnoise())
                .with_additional_libraries(["../Shared/lib/shared.lib"]),
            ModuleDescriptor::new("Shared", module_dir("Shared"))
                .with_public_includes(["Public"])
                .with_additional_libraries(["lib/shared.lib"]),
        ]);

        let resolved = resolve_ok("Root", &catalog);
        assert_eq!(resolved.include_dirs, vec![module_dir("Shared").join("Public")]);
        assert_eq!(
            resolved.additional_libraries,
            vec![module_dir("Shared").join("lib/shared.lib")]
        );
        assert_eq!(resolved.third_party.len(), 1);
        assert!(resolved.diagnostics.is_empty());
    }

    #[test]
    fn test_conflicting_third_party_first_seen_wins() {
        let catalog = catalog(vec![
            ModuleDescriptor::new("Root", module_dir("Root"))
                .with_public_deps(["A", "B"]),
            ModuleDescriptor::new("A", module_dir("A"))
                .with_third_party(libnoise().with_legacy_root("/opt/noise-1.0")),
            ModuleDescriptor::new("B", module_dir("B"))
                .with_third_party(libnoise().with_legacy_root("/opt/noise-2.0")),
        ]);

        let resolved = resolve_ok("Root", &catalog);
        assert_eq!(resolved.third_party.len(), 1);
        assert_eq!(resolved.third_party[0].declared_by, "A");
        assert_eq!(resolved.third_party[0].root, PathBuf::from("/opt/noise-1.0"));

        let conflicts: Vec<_> = resolved
            .diagnostics
            .iter()
            .filter(|d| d.is(codes::CONFLICTING_THIRD_PARTY))
            .collect();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(
            resolved
                .diagnostics
                .iter()
                .filter(|d| d.is(codes::LEGACY_THIRD_PARTY_PATH))
                .count(),
            2
        );
    }

    #[test]
    fn test_legacy_root_resolves_with_diagnostic() {
        let catalog = catalog(vec![ModuleDescriptor::new("Root", module_dir("Root"))
            .with_third_party(
                libnoise().with_legacy_root("/work/GameAlpha/Source/ThirdParty/LibNoise"),
            )]);

        let resolved = resolve_ok("Root", &catalog);
        assert_eq!(resolved.third_party[0].mode, ResolutionMode::Legacy);
        assert_eq!(
            resolved.third_party[0].binary,
            PathBuf::from("/work/GameAlpha/Source/ThirdParty/LibNoise/lib/libnoise.lib")
        );
        assert_eq!(resolved.diagnostics.len(), 1);
    }

    #[test]
    fn test_cycle_aborts_resolution() {
        let catalog = catalog(vec![
            ModuleDescriptor::new("A", module_dir("A")).with_public_deps(["B"]),
            ModuleDescriptor::new("B", module_dir("B")).with_public_deps(["A"]),
        ]);

        let err = resolve("A", &win64(), &catalog, ResolveOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::CyclicDependency {
                cycle: vec!["A".into(), "B".into(), "A".into()]
            }
        );
    }

    #[test]
    fn test_unresolved_dependency_names_missing_module() {
        let catalog = catalog(vec![
            ModuleDescriptor::new("Root", module_dir("Root")).with_public_deps(["Nope"]),
        ]);

        let err = resolve("Root", &win64(), &catalog, ResolveOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnresolvedDependency { ref name, requested_by: Some(ref by), .. }
                if name == "Nope" && by == "Root"
        ));
    }

    #[test]
    fn test_resolution_depends_on_target() {
        let catalog = catalog(vec![ModuleDescriptor::new("Root", module_dir("Root"))
            .with_third_party(ThirdPartyLibrary::new("LibNoise", "noise").with_debug_binary("noised"))]);

        let linux_debug: TargetInfo = "linux-debug".parse().unwrap();
        let win_dev = win64();

        let debug = resolve("Root", &linux_debug, &catalog, ResolveOptions::default()).unwrap();
        let dev = resolve("Root", &win_dev, &catalog, ResolveOptions::default()).unwrap();

        assert!(debug.third_party[0].binary.ends_with("lib/libnoised.a"));
        assert!(dev.third_party[0].binary.ends_with("lib/noise.lib"));
    }

    #[test]
    fn test_verify_paths() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("Source/Root");
        let catalog = catalog(vec![ModuleDescriptor::new("Root", &module)
            .with_public_includes(["Public"])
            .with_third_party(libnoise())]);
        let options = ResolveOptions { verify_paths: true };

        materialize(tmp.path(), &["Source/Root/Public/", "Source/ThirdParty/LibNoise/src/"]);
        let err = resolve("Root", &win64(), &catalog, options).unwrap_err();
        assert_eq!(
            err,
            ResolveError::PathNotFound {
                path: tmp.path().join("Source/ThirdParty/LibNoise/lib/libnoise.lib"),
                mode: ResolutionMode::Derived,
            }
        );

        materialize(tmp.path(), &["Source/ThirdParty/LibNoise/lib/libnoise.lib"]);
        assert!(resolve("Root", &win64(), &catalog, options).is_ok());
    }

    #[test]
    fn test_verify_disabled_tolerates_missing_paths() {
        let catalog = catalog(vec![ModuleDescriptor::new("Root", "/nonexistent/Root")
            .with_public_includes(["Public"])]);
        assert!(resolve("Root", &win64(), &catalog, ResolveOptions::default()).is_ok());
    }
}

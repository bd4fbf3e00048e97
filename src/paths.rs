//! Path resolution for module and third-party locations.
//!
//! Every path is computed from the module's own on-disk location, which is
//! passed in explicitly. Resolution is purely lexical; existence checks are a
//! separate, optional step so callers can batch them.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::target::TargetInfo;
use crate::core::third_party::{ResolutionMode, ThirdPartyLibrary, ThirdPartyRoot, THIRD_PARTY_DIR};
use crate::resolver::errors::ResolveError;
use crate::util::diagnostic::{codes, Diagnostic};
use crate::util::fs::join_normalized;

/// A path together with how it was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub mode: ResolutionMode,
}

impl ResolvedPath {
    /// Fail with `PathNotFound` if the path does not exist.
    pub fn verify(&self) -> Result<(), ResolveError> {
        if self.path.exists() {
            Ok(())
        } else {
            Err(ResolveError::PathNotFound {
                path: self.path.clone(),
                mode: self.mode,
            })
        }
    }
}

/// Verify a batch of paths, failing on the first one missing.
pub fn verify_all<'a>(paths: impl IntoIterator<Item = &'a ResolvedPath>) -> Result<(), ResolveError> {
    for path in paths {
        path.verify()?;
    }
    Ok(())
}

/// Resolve a path fragment declared by a module.
///
/// Relative fragments are taken from the module's directory; absolute ones
/// are kept as written.
pub fn resolve_module_path(location: &Path, fragment: &Path) -> ResolvedPath {
    ResolvedPath {
        path: join_normalized(location, fragment),
        mode: ResolutionMode::Module,
    }
}

/// The root a third-party library resolves to, plus the deprecation notice
/// a legacy root produces.
#[derive(Debug, Clone)]
pub struct RootResolution {
    pub root: ResolvedPath,
    pub diagnostic: Option<Diagnostic>,
}

/// Resolve a third-party library's root directory for the module at `location`.
pub fn resolve_third_party_root(
    module: &str,
    location: &Path,
    lib: &ThirdPartyLibrary,
) -> RootResolution {
    match &lib.root {
        ThirdPartyRoot::Derived => RootResolution {
            root: ResolvedPath {
                path: join_normalized(location, &Path::new("..").join(THIRD_PARTY_DIR).join(&lib.name)),
                mode: ResolutionMode::Derived,
            },
            diagnostic: None,
        },
        ThirdPartyRoot::Legacy(stored) => {
            let path = join_normalized(location, stored);
            tracing::warn!(
                "module `{}` reads third-party library `{}` from stored path {}",
                module,
                lib.name,
                path.display()
            );

            let diagnostic = Diagnostic::warning(format!(
                "module `{}` uses a stored path for third-party library `{}`",
                module, lib.name
            ))
            .with_code(codes::LEGACY_THIRD_PARTY_PATH)
            .with_location(location)
            .with_context(format!("resolved to {}", path.display()))
            .with_suggestion(format!(
                "remove the stored path and place the library at `../{}/{}` relative to the module",
                THIRD_PARTY_DIR, lib.name
            ));

            RootResolution {
                root: ResolvedPath {
                    path,
                    mode: ResolutionMode::Legacy,
                },
                diagnostic: Some(diagnostic),
            }
        }
    }
}

/// A third-party library with every path materialized for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedThirdParty {
    /// Logical name
    pub name: String,
    /// Module whose declaration was used
    pub declared_by: String,
    /// Resolution mode of the root
    pub mode: ResolutionMode,
    /// Root directory
    pub root: PathBuf,
    /// Absolute include directory
    pub include_dir: PathBuf,
    /// Absolute path to the binary for the target
    pub binary: PathBuf,
}

impl ResolvedThirdParty {
    /// Check if two resolutions of the same library disagree.
    pub fn conflicts_with(&self, other: &ResolvedThirdParty) -> bool {
        self.name == other.name
            && (self.include_dir != other.include_dir || self.binary != other.binary)
    }

    /// The paths a verification pass should check.
    pub fn verifiable_paths(&self) -> [ResolvedPath; 2] {
        [
            ResolvedPath {
                path: self.include_dir.clone(),
                mode: self.mode,
            },
            ResolvedPath {
                path: self.binary.clone(),
                mode: self.mode,
            },
        ]
    }
}

/// Materialize a library's include directory and binary path.
pub fn resolve_third_party(
    module: &str,
    location: &Path,
    lib: &ThirdPartyLibrary,
    target: &TargetInfo,
) -> (ResolvedThirdParty, Option<Diagnostic>) {
    let RootResolution { root, diagnostic } = resolve_third_party_root(module, location, lib);

    let include_dir = join_normalized(&root.path, &lib.include_dir);
    let binary = join_normalized(&root.path.join(&lib.lib_dir), Path::new(&lib.binary_for(target)));

    let resolved = ResolvedThirdParty {
        name: lib.name.clone(),
        declared_by: module.to_string(),
        mode: root.mode,
        root: root.path,
        include_dir,
        binary,
    };
    (resolved, diagnostic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::{Configuration, Platform};
    use std::fs;
    use tempfile::TempDir;

    fn target() -> TargetInfo {
        TargetInfo::new(Platform::Win64, Configuration::Development)
    }

    fn noise() -> ThirdPartyLibrary {
        ThirdPartyLibrary::new("LibNoise", "libnoise.lib").with_include_dir("src")
    }

    #[test]
    fn test_derived_root() {
        let location = Path::new("/work/Game/Source/GameAlpha");
        let resolution = resolve_third_party_root("GameAlpha", location, &noise());

        assert_eq!(
            resolution.root.path,
            PathBuf::from("/work/Game/Source/ThirdParty/LibNoise")
        );
        assert_eq!(resolution.root.mode, ResolutionMode::Derived);
        assert!(resolution.diagnostic.is_none());
    }

    #[test]
    fn test_legacy_root_warns() {
        let location = Path::new("/work/Game/Source/GameAlpha");
        let lib = noise().with_legacy_root("/opt/ThirdParty/LibNoise/");
        let resolution = resolve_third_party_root("GameAlpha", location, &lib);

        assert_eq!(resolution.root.path, PathBuf::from("/opt/ThirdParty/LibNoise"));
        assert_eq!(resolution.root.mode, ResolutionMode::Legacy);
        let diag = resolution.diagnostic.unwrap();
        assert!(diag.is(codes::LEGACY_THIRD_PARTY_PATH));
    }

    #[test]
    fn test_legacy_and_derived_agree_on_equivalent_roots() {
        let location = Path::new("/work/Game/Source/GameAlpha");
        let derived = noise();
        let legacy = noise().with_legacy_root("/work/Game/Source/ThirdParty/LibNoise");

        let (a, diag_a) = resolve_third_party("GameAlpha", location, &derived, &target());
        let (b, diag_b) = resolve_third_party("GameAlpha", location, &legacy, &target());

        assert_eq!(a.include_dir, b.include_dir);
        assert_eq!(a.binary, b.binary);
        assert!(diag_a.is_none());
        assert!(diag_b.is_some());
    }

    #[test]
    fn test_resolve_third_party_paths() {
        let location = Path::new("/work/Game/Source/GameAlpha");
        let (lib, _) = resolve_third_party("GameAlpha", location, &noise(), &target());

        assert_eq!(
            lib.include_dir,
            PathBuf::from("/work/Game/Source/ThirdParty/LibNoise/src")
        );
        assert_eq!(
            lib.binary,
            PathBuf::from("/work/Game/Source/ThirdParty/LibNoise/lib/libnoise.lib")
        );
    }

    #[test]
    fn test_module_path() {
        let resolved = resolve_module_path(Path::new("/work/Source/Game"), Path::new("Public"));
        assert_eq!(resolved.path, PathBuf::from("/work/Source/Game/Public"));
        assert_eq!(resolved.mode, ResolutionMode::Module);
    }

    #[test]
    fn test_verify_reports_missing_path() {
        let tmp = TempDir::new().unwrap();
        let present = tmp.path().join("src");
        fs::create_dir(&present).unwrap();

        let ok = ResolvedPath {
            path: present,
            mode: ResolutionMode::Derived,
        };
        assert!(ok.verify().is_ok());

        let missing = ResolvedPath {
            path: tmp.path().join("lib/libnoise.lib"),
            mode: ResolutionMode::Legacy,
        };
        match verify_all([&ok, &missing]) {
            Err(ResolveError::PathNotFound { path, mode }) => {
                assert_eq!(path, tmp.path().join("lib/libnoise.lib"));
                assert_eq!(mode, ResolutionMode::Legacy);
            }
            other => panic!("expected PathNotFound, got {:?}", other),
        }
    }
}

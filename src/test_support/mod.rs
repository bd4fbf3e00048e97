//! Test fixtures for resolution scenarios.
//!
//! Catalog builders shared by unit tests across the crate. Locations are
//! plain absolute paths; nothing here touches the filesystem unless a
//! function takes a root directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::catalog::ModuleCatalog;
use crate::core::module::ModuleDescriptor;
use crate::core::target::{Configuration, Platform, TargetInfo};
use crate::core::third_party::ThirdPartyLibrary;

/// Engine modules the game fixtures depend on by name only.
pub const ENGINE_MODULES: &[&str] = &["Core", "CoreUObject", "Engine", "InputCore"];

/// Root directory of the in-memory fixture project.
pub fn project_root() -> PathBuf {
    PathBuf::from("/work/GameAlpha")
}

/// Location of a fixture module under `Source/`.
pub fn module_dir(name: &str) -> PathBuf {
    project_root().join("Source").join(name)
}

/// The default fixture target.
pub fn win64() -> TargetInfo {
    TargetInfo::new(Platform::Win64, Configuration::Development)
}

/// The LibNoise library as the game module declares it.
pub fn libnoise() -> ThirdPartyLibrary {
    ThirdPartyLibrary::new("LibNoise", "libnoise.lib").with_include_dir("src")
}

/// A game module with public engine dependencies, a private dependency on
/// `CustomMeshComponent`, and the LibNoise library.
pub fn game_module() -> ModuleDescriptor {
    ModuleDescriptor::new("GameAlpha", module_dir("GameAlpha"))
        .with_public_deps(ENGINE_MODULES.iter().copied())
        .with_private_deps(["CustomMeshComponent"])
        .with_private_include_path_modules(["CustomMeshComponent"])
        .with_third_party(libnoise())
}

/// The catalog around `game_module`.
pub fn game_catalog() -> ModuleCatalog {
    ModuleCatalog::from_descriptors([
        game_module(),
        ModuleDescriptor::new("CustomMeshComponent", module_dir("CustomMeshComponent"))
            .with_public_deps(["Engine"])
            .with_public_includes(["Public"])
            .with_private_includes(["Private"]),
    ])
    .unwrap()
    .with_opaque(ENGINE_MODULES.iter().copied())
}

/// A linear chain `M0 -> M1 -> ... -> M{len-1}` of public edges, each module
/// exporting `Public`.
pub fn public_chain(len: usize) -> ModuleCatalog {
    let modules = (0..len).map(|i| {
        let name = format!("M{}", i);
        let descriptor =
            ModuleDescriptor::new(&name, module_dir(&name)).with_public_includes(["Public"]);
        if i + 1 < len {
            descriptor.with_public_deps([format!("M{}", i + 1)])
        } else {
            descriptor
        }
    });
    ModuleCatalog::from_descriptors(modules).unwrap()
}

/// Create the directories and files a resolved fixture points at.
pub fn materialize(root: &Path, relative_paths: &[&str]) {
    for rel in relative_paths {
        let path = root.join(rel);
        if rel.ends_with('/') {
            fs::create_dir_all(&path).unwrap();
        } else {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"").unwrap();
        }
    }
}

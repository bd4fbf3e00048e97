//! Configuration emitter.
//!
//! Flattens a `ResolvedConfiguration` into the two ordered lists the build
//! driver consumes. No resolution happens here.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::target::TargetInfo;
use crate::resolver::resolve::ResolvedConfiguration;
use crate::util::hash::Fingerprint;

/// Final include directories and link libraries for one root and target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedConfiguration {
    pub root: String,
    pub target: TargetInfo,
    pub include_dirs: Vec<PathBuf>,
    pub link_libraries: Vec<PathBuf>,
}

/// Flatten a resolution.
///
/// Module include directories come first, then each third-party library's
/// include directory. Link libraries are the modules' additional libraries
/// followed by each third-party binary. Both lists keep the resolver's order
/// and drop repeats.
pub fn emit(resolved: &ResolvedConfiguration) -> EmittedConfiguration {
    let include_dirs = dedup(
        resolved
            .include_dirs
            .iter()
            .chain(resolved.third_party.iter().map(|lib| &lib.include_dir)),
    );
    let link_libraries = dedup(
        resolved
            .additional_libraries
            .iter()
            .chain(resolved.third_party.iter().map(|lib| &lib.binary)),
    );

    EmittedConfiguration {
        root: resolved.root.clone(),
        target: resolved.target,
        include_dirs,
        link_libraries,
    }
}

fn dedup<'a>(paths: impl Iterator<Item = &'a PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .filter(|path| seen.insert(*path))
        .cloned()
        .collect()
}

impl EmittedConfiguration {
    /// SHA256 over both lists, in order.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        fp.update_str(&self.root)
            .update_str(&self.target.to_string())
            .update_paths(self.include_dirs.iter().map(PathBuf::as_path))
            .update_paths(self.link_libraries.iter().map(PathBuf::as_path));
        fp.finish()
    }

    /// Render as compiler driver arguments: `-I<dir>` for each include
    /// directory, then each library path.
    pub fn to_flags(&self) -> Vec<String> {
        self.include_dirs
            .iter()
            .map(|dir| format!("-I{}", dir.display()))
            .chain(
                self.link_libraries
                    .iter()
                    .map(|lib| lib.display().to_string()),
            )
            .collect()
    }
}

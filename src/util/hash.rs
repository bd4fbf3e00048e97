//! Hashing utilities for fingerprinting resolved output.

use std::path::Path;

use sha2::{Digest, Sha256};

/// A hasher for building fingerprints from multiple components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0"); // Separator
        self
    }

    /// Add a path component, using its lossy UTF-8 form.
    pub fn update_path(&mut self, path: &Path) -> &mut Self {
        self.update_str(&path.to_string_lossy())
    }

    /// Add a list of paths. The length is hashed first so that
    /// `[a, b] + []` and `[a] + [b]` differ.
    pub fn update_paths<'a>(&mut self, paths: impl ExactSizeIterator<Item = &'a Path>) -> &mut Self {
        self.hasher.update((paths.len() as u64).to_le_bytes());
        for path in paths {
            self.update_path(path);
        }
        self
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

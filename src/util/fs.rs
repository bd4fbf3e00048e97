//! Filesystem utilities.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use path_clean::PathClean;

/// Find files matching glob patterns relative to a base directory.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in glob(&pattern_str)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Lexically normalize a path, folding `.` and `..` components.
///
/// Unlike `canonicalize`, this never touches the filesystem, so the result
/// is the same whether or not the path exists.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.clean()
}

/// Join `fragment` onto `base` and normalize. An absolute fragment replaces `base`.
pub fn join_normalized(base: &Path, fragment: &Path) -> PathBuf {
    normalize_path(&base.join(fragment))
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

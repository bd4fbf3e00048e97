//! Resolution error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::third_party::ResolutionMode;
use crate::util::diagnostic::Diagnostic;

/// Fatal error during resolution. The first one aborts the whole request.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("path not found: {} ({mode} resolution)", path.display())]
    #[diagnostic(code(modrules::paths::not_found))]
    PathNotFound { path: PathBuf, mode: ResolutionMode },

    #[error("cyclic dependency: {}", cycle.join(" -> "))]
    #[diagnostic(
        code(modrules::resolve::cycle),
        help("break the cycle by removing or restructuring a dependency")
    )]
    CyclicDependency { cycle: Vec<String> },

    #[error(
        "unknown module `{name}`{}",
        requested_by.as_ref().map(|m| format!(", required by `{}`", m)).unwrap_or_default()
    )]
    #[diagnostic(code(modrules::resolve::unresolved))]
    UnresolvedDependency {
        name: String,
        /// The module declaring the dependency; `None` for the requested root itself.
        requested_by: Option<String>,
        suggestions: Vec<String>,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::PathNotFound { path, mode } => {
                let mut diag = Diagnostic::error(format!("path not found: {}", path.display()))
                    .with_code("modrules::paths::not_found")
                    .with_context(format!("resolved in {} mode", mode));

                diag = match mode {
                    ResolutionMode::Legacy => diag.with_suggestion(
                        "the stored path is machine-specific; switch the descriptor to a derived third-party path",
                    ),
                    ResolutionMode::Derived => diag.with_suggestion(
                        "place the library under the ThirdParty directory next to the module directory",
                    ),
                    ResolutionMode::Module => {
                        diag.with_suggestion("check the path is relative to the module directory")
                    }
                };

                diag
            }

            ResolveError::CyclicDependency { cycle } => {
                Diagnostic::error("cyclic dependency between modules")
                    .with_code("modrules::resolve::cycle")
                    .with_context(format!("cycle: {}", cycle.join(" -> ")))
                    .with_suggestion("break the cycle by removing or restructuring a dependency")
            }

            ResolveError::UnresolvedDependency {
                name,
                requested_by,
                suggestions,
            } => {
                let mut diag = Diagnostic::error(format!("could not find module `{}`", name))
                    .with_code("modrules::resolve::unresolved");

                if let Some(requested_by) = requested_by {
                    diag = diag.with_context(format!("required by `{}`", requested_by));
                }

                if !suggestions.is_empty() {
                    diag = diag.with_context(format!("did you mean: {}?", suggestions.join(", ")));
                }

                diag.with_suggestion(
                    "add a descriptor for the module, or list it as an opaque module in the catalog config",
                )
            }
        }
    }
}

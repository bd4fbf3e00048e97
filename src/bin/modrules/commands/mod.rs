//! Command implementations

pub mod check;
pub mod completions;
pub mod resolve;
pub mod tree;

use modrules::util::diagnostic::{emit, Diagnostic};
use modrules::GlobalContext;

/// Print non-fatal diagnostics to stderr.
pub fn report_diagnostics<'a>(ctx: &GlobalContext, diagnostics: impl IntoIterator<Item = &'a Diagnostic>) {
    for diagnostic in diagnostics {
        emit(diagnostic, ctx.color());
    }
}

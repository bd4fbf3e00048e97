//! `modrules check` command

use anyhow::{bail, Result};

use crate::cli::CheckArgs;
use crate::commands::report_diagnostics;
use modrules::ops::{check_catalog, Project};
use modrules::util::diagnostic::emit;
use modrules::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: CheckArgs) -> Result<()> {
    let project = Project::load(ctx)?;
    let targets = if args.targets.is_empty() {
        vec![project.target(None)?]
    } else {
        args.targets
    };
    let options = project.resolve_options(args.verify);

    let report = check_catalog(project.catalog(), &targets, options);

    report_diagnostics(ctx, &report.warnings);
    for failure in &report.failures {
        let diagnostic = failure.error.to_diagnostic().with_context(format!(
            "while resolving `{}` for {}",
            failure.request.module, failure.request.target
        ));
        emit(&diagnostic, ctx.color());
    }

    println!(
        "checked {} module/target pairs: {} failed, {} warnings",
        report.checked,
        report.failures.len(),
        report.warnings.len()
    );

    if !report.is_ok() {
        bail!("{} resolution(s) failed", report.failures.len());
    }

    Ok(())
}

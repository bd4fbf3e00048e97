//! `modrules resolve` command

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::cli::ResolveArgs;
use crate::commands::report_diagnostics;
use modrules::ops::{resolve_module, Project};
use modrules::util::diagnostic::{emit, Diagnostic};
use modrules::{EmittedConfiguration, GlobalContext};

/// JSON shape of `modrules resolve --json`.
#[derive(Serialize)]
struct ResolveOutput<'a> {
    #[serde(flatten)]
    emitted: &'a EmittedConfiguration,
    modules: &'a [String],
    fingerprint: String,
    diagnostics: &'a [Diagnostic],
}

pub fn execute(ctx: &GlobalContext, args: ResolveArgs) -> Result<()> {
    let project = Project::load(ctx)?;
    let target = project.target(args.target)?;
    let options = project.resolve_options(args.verify);

    let resolution = match resolve_module(project.catalog(), &args.module, &target, options) {
        Ok(resolution) => resolution,
        Err(e) => {
            emit(&e.to_diagnostic(), ctx.color());
            bail!("failed to resolve `{}` for {}", args.module, target);
        }
    };
    let emitted = &resolution.emitted;

    if args.json {
        let output = ResolveOutput {
            emitted,
            modules: &resolution.resolved.modules,
            fingerprint: emitted.fingerprint(),
            diagnostics: &resolution.resolved.diagnostics,
        };
        let json = serde_json::to_string_pretty(&output)
            .context("failed to serialize resolution")?;
        println!("{}", json);
        return Ok(());
    }

    report_diagnostics(ctx, &resolution.resolved.diagnostics);

    if args.flags {
        println!("{}", emitted.to_flags().join(" "));
        return Ok(());
    }

    println!("# Include directories for `{}` ({}):", emitted.root, target);
    for dir in &emitted.include_dirs {
        println!("  -I{}", dir.display());
    }
    println!();
    println!("# Link libraries for `{}` ({}):", emitted.root, target);
    for lib in &emitted.link_libraries {
        println!("  {}", lib.display());
    }

    println!();
    println!("# fingerprint: {}", emitted.fingerprint());

    Ok(())
}

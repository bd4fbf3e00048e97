//! `modrules tree` command

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Result};

use crate::cli::TreeArgs;
use modrules::core::ModuleCatalog;
use modrules::ops::Project;
use modrules::resolver::{DependencyGraph, Visibility};
use modrules::util::diagnostic::emit;
use modrules::util::fs::relative_path;
use modrules::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: TreeArgs) -> Result<()> {
    let project = Project::load(ctx)?;
    let target = project.target(args.target)?;

    let graph = match DependencyGraph::build(&args.module, &target, project.catalog()) {
        Ok(graph) => graph,
        Err(e) => {
            emit(&e.to_diagnostic(), ctx.color());
            bail!("failed to build dependency graph for `{}`", args.module);
        }
    };

    let printer = TreePrinter {
        graph: &graph,
        catalog: project.catalog(),
        project_root: ctx.is_verbose().then(|| project.root()),
        max_depth: args.depth.unwrap_or(usize::MAX),
    };
    printer.print(graph.root(), None, 0, &mut HashSet::new());

    Ok(())
}

struct TreePrinter<'g> {
    graph: &'g DependencyGraph,
    catalog: &'g ModuleCatalog,
    /// Set in verbose mode to show each module's directory
    project_root: Option<&'g Path>,
    max_depth: usize,
}

impl<'g> TreePrinter<'g> {
    fn print(
        &self,
        module: &'g str,
        visibility: Option<Visibility>,
        depth: usize,
        seen: &mut HashSet<&'g str>,
    ) {
        if depth > self.max_depth {
            return;
        }

        let is_duplicate = !seen.insert(module);

        let prefix = if depth == 0 {
            String::new()
        } else {
            format!("{}├── ", "│   ".repeat(depth - 1))
        };
        let edge = match visibility {
            Some(Visibility::Private) => " [private]",
            _ => "",
        };
        let descriptor = self.catalog.get(module);
        let detail = match (descriptor, self.project_root) {
            (Some(d), _) if d.is_opaque() => " (opaque)".to_string(),
            (Some(d), Some(root)) => format!(" ({})", relative_path(root, d.location()).display()),
            _ => String::new(),
        };
        let dup_marker = if is_duplicate { " (*)" } else { "" };

        println!("{}{}{}{}{}", prefix, module, edge, detail, dup_marker);

        // Don't recurse into modules already printed
        if is_duplicate {
            return;
        }

        for (dep, vis) in self.graph.dependencies(module) {
            self.print(dep, Some(vis), depth + 1, seen);
        }
    }
}

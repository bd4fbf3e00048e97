//! modrules CLI - module dependency rules for engine-style builds

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use modrules::GlobalContext;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("modrules=debug")
    } else {
        EnvFilter::new("modrules=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = match cli.directory {
        Some(dir) => GlobalContext::with_cwd(dir)?,
        None => GlobalContext::new()?,
    };
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color && std::io::stderr().is_terminal());

    // Execute command
    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(&ctx, args),
        Commands::Tree(args) => commands::tree::execute(&ctx, args),
        Commands::Check(args) => commands::check::execute(&ctx, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

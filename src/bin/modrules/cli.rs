//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use modrules::TargetInfo;

/// modrules - resolve module dependency rules into include paths and link libraries
#[derive(Parser)]
#[command(name = "modrules")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Run as if started in <DIR>
    #[arg(short = 'C', value_name = "DIR", global = true)]
    pub directory: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a module's include directories and link libraries
    Resolve(ResolveArgs),

    /// Display a module's dependency tree
    Tree(TreeArgs),

    /// Resolve every module in the catalog
    Check(CheckArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Root module to resolve
    pub module: String,

    /// Target as <platform>[-<configuration>], e.g. win64-debug
    #[arg(short, long, env = "MODRULES_TARGET")]
    pub target: Option<TargetInfo>,

    /// Fail if a resolved path does not exist
    #[arg(long)]
    pub verify: bool,

    /// Print JSON instead of text
    #[arg(long, conflicts_with = "flags")]
    pub json: bool,

    /// Print compiler driver arguments on one line
    #[arg(long)]
    pub flags: bool,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Root module
    pub module: String,

    /// Target as <platform>[-<configuration>]
    #[arg(short, long, env = "MODRULES_TARGET")]
    pub target: Option<TargetInfo>,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Targets to check; may be repeated
    #[arg(short, long = "target")]
    pub targets: Vec<TargetInfo>,

    /// Fail if a resolved path does not exist
    #[arg(long)]
    pub verify: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

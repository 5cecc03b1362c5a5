//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// modbound - keep module-boundary rules in build files up to date
#[derive(Parser)]
#[command(name = "modbound")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk the tree and update module rules in build files
    Generate(GenerateArgs),

    /// Show which manifest directory governs a directory
    Resolve(ResolveArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Root of the source tree (defaults to current directory)
    pub root: Option<PathBuf>,

    /// Show what would change without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Print a JSON report instead of a summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Directory to resolve
    pub dir: PathBuf,

    /// Root of the source tree (defaults to current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

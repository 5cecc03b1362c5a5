//! modbound CLI - module-boundary rules for build files

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use modbound::util::diagnostic;
use modbound::BoundaryError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let color = !cli.no_color;

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("modbound=debug")
    } else {
        EnvFilter::new("modbound=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, color),
        Commands::Resolve(args) => commands::resolve::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error, using the richest rendering available for its type.
fn report(e: &anyhow::Error, color: bool) {
    if let Some(err) = e.downcast_ref::<BoundaryError>() {
        diagnostic::emit(&err.to_diagnostic(), color);
        return;
    }

    eprintln!("error: {:#}", e);
}

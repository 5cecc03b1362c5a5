//! `modbound generate` command

use anyhow::{Context, Result};

use crate::cli::GenerateArgs;
use crate::commands::{config_for, root_dir};
use modbound::ops::{generate, GenerateOptions};
use modbound::util::diagnostic::{self, suggestions, Diagnostic};

pub fn execute(args: GenerateArgs, color: bool) -> Result<()> {
    let root = root_dir(args.root)?;
    let config = config_for(&root);

    let opts = GenerateOptions {
        root,
        dry_run: args.dry_run,
    };
    let report = generate(&config, &opts)?;

    for skipped in &report.skipped {
        eprint!("{}", skipped.rendered);
        let warning = Diagnostic::warning("build file could not be parsed and was left untouched")
            .with_location(skipped.path.clone())
            .with_suggestion(suggestions::BAD_BUILD_FILE);
        diagnostic::emit(&warning, color);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{}", json);
        return Ok(());
    }

    for emitted in &report.emitted {
        println!(
            "{} //{}:{} ({} deps)",
            emitted.module_path.as_deref().unwrap_or("-"),
            emitted.package,
            emitted.name,
            emitted.deps.len()
        );
    }

    let verb = if args.dry_run { "Would update" } else { "Updated" };
    println!(
        "{} {} build file(s) across {} directories",
        verb,
        report.written.len(),
        report.directories
    );

    Ok(())
}

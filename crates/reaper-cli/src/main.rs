//! branch-reaper CLI - remind, archive and delete stale git branches.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;

mod commands;
mod output;

use commands::{Cli, Commands, Outcome};

/// Exit status when some branches or recipients failed.
const EXIT_PARTIAL_FAILURE: i32 = 2;

fn main() {
    let cli = Cli::parse();
    output::set_quiet(cli.quiet);

    if let Err(e) = configure_tracing(&cli) {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Notify => commands::notify::run(&cli.config),
        Commands::Delete { dry_run } => commands::delete::run(&cli.config, dry_run),
        Commands::List { json, days } => commands::list::run(&cli.config, json, days),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    match result {
        Ok(Outcome::Clean) => {}
        Ok(Outcome::PartialFailure) => std::process::exit(EXIT_PARTIAL_FAILURE),
        Err(e) => {
            output::error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

/// Install the global tracing subscriber writing to stderr.
fn configure_tracing(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{EnvFilter, filter::LevelFilter};

    let level_filter = if cli.quiet {
        LevelFilter::ERROR
    } else {
        match cli.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("REAPER_LOG")
        .from_env()
        .context("Failed to parse filters from REAPER_LOG environment variable")?;

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

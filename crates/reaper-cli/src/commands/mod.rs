//! Command-line interface definition.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub mod completions;
pub mod delete;
pub mod list;
pub mod notify;
mod utils;

/// Find git branches nobody commits to, remind their authors, then archive
/// and delete them.
#[derive(Debug, Parser)]
#[command(name = "branch-reaper", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "branch-reaper.toml")]
    pub config: PathBuf,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Email authors a reminder about their stale branches
    Notify,

    /// Archive and delete branches past the delete threshold
    Delete {
        /// Show what would be deleted without touching anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List stale branches
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Threshold in days (defaults to the notify threshold)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// How a command finished when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// Some branches or recipients failed; details were printed.
    PartialFailure,
}

impl Outcome {
    #[must_use]
    pub const fn from_failures(failed: bool) -> Self {
        if failed { Self::PartialFailure } else { Self::Clean }
    }
}

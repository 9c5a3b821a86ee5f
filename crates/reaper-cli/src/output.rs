//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use reaper_core::{BranchState, Delivery};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print essential machine-readable output (always prints).
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Get the indicator for a branch's final state.
#[must_use]
pub fn state_indicator(state: BranchState) -> String {
    match state {
        BranchState::Deleted => "●".green().to_string(),
        BranchState::DeleteFailed => "●".yellow().to_string(),
        BranchState::ArchiveFailed => "●".red().to_string(),
        BranchState::Candidate
        | BranchState::Archiving
        | BranchState::Archived
        | BranchState::Deleting => "○".dimmed().to_string(),
    }
}

/// Describe where a notification ended up.
#[must_use]
pub fn delivery(delivery: &Delivery, recipient: &str) -> String {
    match delivery {
        Delivery::Author => format!("{} {recipient}", "✉".green()),
        Delivery::Admin { error } => {
            format!("{} {recipient} (sent to admin: {error})", "✉".yellow())
        }
        Delivery::Failed { error, admin_error } => format!(
            "{} {recipient} ({error}; admin: {admin_error})",
            "✉".red()
        ),
    }
}

/// Print a horizontal line (suppressed in quiet mode).
pub fn hr() {
    if !is_quiet() {
        println!("{}", "─".repeat(50).dimmed());
    }
}

//! `branch-reaper notify` command - Remind authors about stale branches.

use std::path::Path;

use anyhow::Result;
use chrono::Local;
use reaper_core::{LifecycleService, NotifyReport};

use super::Outcome;
use super::utils;
use crate::output;

/// Run the notify command.
pub fn run(config_path: &Path) -> Result<Outcome> {
    let (repo, config) = utils::open_repo_and_config(config_path)?;
    let notifier = utils::notifier(&config);
    let service = LifecycleService::from_config(&repo, &notifier, &config)?;

    let report = service.notify_stale(&Local::now())?;
    print_report(&report, config.stale.notify_days);

    let summary = report.summary();
    utils::print_summary(&summary);
    Ok(Outcome::from_failures(summary.has_failures()))
}

fn print_report(report: &NotifyReport, days: u32) {
    if report.stale.is_empty() {
        output::info(&format!("No branches without commits for {days} days"));
    }

    for skipped in &report.skipped {
        output::warn(&format!("{}: {}", skipped.branch.name, skipped.error));
    }

    for n in &report.notifications {
        output::detail(&format!(
            "  {} {}",
            output::delivery(&n.delivery, &n.author.email),
            n.branches.join(", ")
        ));
    }
}

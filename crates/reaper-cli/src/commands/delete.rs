//! `branch-reaper delete` command - Archive and delete stale branches.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use reaper_core::{BranchState, DeleteReport, GitPatchArchive, LifecycleService};

use super::Outcome;
use super::{list, utils};
use crate::output;

/// Run the delete command.
pub fn run(config_path: &Path, dry_run: bool) -> Result<Outcome> {
    let (repo, config) = utils::open_repo_and_config(config_path)?;
    let notifier = utils::notifier(&config);
    let service = LifecycleService::from_config(&repo, &notifier, &config)?;
    let now = Local::now();

    if dry_run {
        let plan = service.plan_deletion(&now)?;
        list::print_branches(&plan, config.stale.delete_days);
        if !plan.stale.is_empty() {
            output::info("Dry run: nothing was archived, deleted or sent");
        }
        return Ok(Outcome::from_failures(!plan.skipped.is_empty()));
    }

    let archive_url = config
        .archive_url()
        .context("The delete workflow needs an archive repository")?;
    let archive = GitPatchArchive::new(archive_url, config.git_settings());

    let report = service.delete_stale(&archive, &now)?;
    print_report(&report, config.stale.delete_days);

    let summary = report.summary();
    utils::print_summary(&summary);
    Ok(Outcome::from_failures(summary.has_failures()))
}

fn print_report(report: &DeleteReport, days: u32) {
    if report.branches.is_empty() {
        output::info(&format!("No branches without commits for {days} days"));
    }

    for skipped in &report.skipped {
        output::warn(&format!("{}: {}", skipped.branch.name, skipped.error));
    }

    for outcome in &report.branches {
        let name = outcome.branch.short_name();
        let indicator = output::state_indicator(outcome.state);
        match (outcome.state, &outcome.error) {
            (BranchState::Deleted, _) => {
                let file = outcome
                    .archive
                    .as_ref()
                    .map_or("", |patch| patch.file_name.as_str());
                output::success(&format!("{indicator} {name} deleted, patch {file}"));
            }
            (state, Some(error)) => {
                let what = if state == BranchState::ArchiveFailed {
                    "not archived, kept"
                } else {
                    "archived but not deleted"
                };
                output::warn(&format!("{indicator} {name} {what}: {error}"));
            }
            (state, None) => output::detail(&format!("{indicator} {name} {state:?}")),
        }
    }

    for n in &report.notifications {
        output::detail(&format!(
            "  {} {}",
            output::delivery(&n.delivery, &n.author.email),
            n.branches.join(", ")
        ));
    }
}

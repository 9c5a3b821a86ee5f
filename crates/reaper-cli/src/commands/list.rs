//! `branch-reaper list` command - Show stale branches without acting on them.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;
use reaper_core::{BranchInfo, Classification, LifecycleService};
use serde::Serialize;

use super::Outcome;
use super::utils;
use crate::output;

/// Run the list command.
pub fn run(config_path: &Path, json: bool, days: Option<u32>) -> Result<Outcome> {
    let (repo, config) = utils::open_repo_and_config(config_path)?;
    let notifier = utils::notifier(&config);
    let service = LifecycleService::from_config(&repo, &notifier, &config)?;

    let days = days.unwrap_or(config.stale.notify_days);
    let classification = service.list(&Local::now(), days)?;

    if json {
        let out = JsonOutput::new(days, &classification);
        output::essential(&serde_json::to_string_pretty(&out)?);
    } else {
        print_branches(&classification, days);
    }

    Ok(Outcome::from_failures(!classification.skipped.is_empty()))
}

/// Print a classification as a human-readable table.
pub fn print_branches(classification: &Classification, days: u32) {
    if classification.stale.is_empty() {
        output::info(&format!("No branches without commits for {days} days"));
    } else {
        output::info(&format!(
            "{} branches without commits for {days} days:",
            classification.stale.len()
        ));
        for info in &classification.stale {
            output::detail(&format!(
                "  {}  {} <{}>  {}  {}",
                info.short_name().bold(),
                info.last_commit.author.name,
                info.last_commit.author.email,
                format_time(info.last_commit.time).dimmed(),
                info.last_commit.summary
            ));
        }
    }

    for skipped in &classification.skipped {
        output::warn(&format!("{}: {}", skipped.branch.name, skipped.error));
    }
}

fn format_time(epoch_seconds: i64) -> String {
    DateTime::from_timestamp(epoch_seconds, 0).map_or_else(
        || epoch_seconds.to_string(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

#[derive(Debug, Serialize)]
struct JsonOutput {
    days: u32,
    stale: Vec<JsonBranch>,
    skipped: Vec<JsonSkipped>,
}

impl JsonOutput {
    fn new(days: u32, classification: &Classification) -> Self {
        Self {
            days,
            stale: classification.stale.iter().map(JsonBranch::from).collect(),
            skipped: classification
                .skipped
                .iter()
                .map(|s| JsonSkipped {
                    ref_name: s.branch.name.clone(),
                    error: s.error.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonBranch {
    name: String,
    ref_name: String,
    author: String,
    email: String,
    last_commit: String,
    last_commit_time: i64,
    summary: String,
}

impl From<&BranchInfo> for JsonBranch {
    fn from(info: &BranchInfo) -> Self {
        Self {
            name: info.short_name().to_string(),
            ref_name: info.branch.name.clone(),
            author: info.last_commit.author.name.clone(),
            email: info.last_commit.author.email.clone(),
            last_commit: info.last_commit.id.to_string(),
            last_commit_time: info.last_commit.time,
            summary: info.last_commit.summary.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonSkipped {
    ref_name: String,
    error: String,
}

//! Message templates for reminders and deletion notices.

use std::fmt::Write as _;

use chrono::{Local, TimeZone};
use serde::Deserialize;

use crate::classify::BranchInfo;

/// Language of the shipped templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ru,
    En,
}

/// Values available to a reminder.
#[derive(Debug, Clone, Copy)]
pub struct NotifyContext<'a> {
    /// Display name of the recipient.
    pub recipient: &'a str,
    /// Repository name.
    pub repository: &'a str,
    /// Branch list page of the repository.
    pub branches_url: &'a str,
    /// Notify threshold in days.
    pub stale_days: u32,
    /// Branches of this recipient.
    pub branches: &'a [BranchInfo],
}

/// Values available to a deletion notice.
#[derive(Debug, Clone, Copy)]
pub struct DeleteContext<'a> {
    /// Display name of the recipient.
    pub recipient: &'a str,
    /// Branch list page of the repository.
    pub branches_url: &'a str,
    /// Branch list page of the archive repository.
    pub archive_url: &'a str,
    /// Delete threshold in days.
    pub stale_days: u32,
    /// Deleted branches of this recipient.
    pub branches: &'a [BranchInfo],
}

/// Renders subjects and bodies of outgoing mail.
pub trait Templates {
    /// Subject of a stale branch reminder.
    fn notify_subject(&self, repository: &str) -> String;

    /// Body of a stale branch reminder.
    fn notify_body(&self, ctx: &NotifyContext<'_>) -> String;

    /// Subject of a deletion notice.
    fn delete_subject(&self, project: &str) -> String;

    /// Body of a deletion notice.
    fn delete_body(&self, ctx: &DeleteContext<'_>) -> String;
}

/// Templates for a configured language.
#[must_use]
pub fn templates_for(language: Language) -> Box<dyn Templates> {
    match language {
        Language::Ru => Box::new(RussianTemplates),
        Language::En => Box::new(EnglishTemplates),
    }
}

/// Last-commit timestamp as `dd.MM.yyyy hh:mm` in the local zone.
#[must_use]
pub fn format_commit_time(epoch_seconds: i64) -> String {
    Local
        .timestamp_opt(epoch_seconds, 0)
        .single()
        .map_or_else(|| epoch_seconds.to_string(), |t| t.format("%d.%m.%Y %I:%M").to_string())
}

fn by_commit_time(branches: &[BranchInfo]) -> Vec<&BranchInfo> {
    let mut sorted: Vec<&BranchInfo> = branches.iter().collect();
    sorted.sort_by_key(|b| b.last_commit.time);
    sorted
}

fn write_branch_lines(out: &mut String, branches: &[BranchInfo], last_commit_label: &str) {
    for info in by_commit_time(branches) {
        let _ = writeln!(out, "\t* {}", info.short_name());
        let _ = writeln!(
            out,
            "\t  {last_commit_label}: {}, {}",
            format_commit_time(info.last_commit.time),
            info.last_commit.summary
        );
    }
}

/// Russian wording, the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct RussianTemplates;

impl Templates for RussianTemplates {
    fn notify_subject(&self, repository: &str) -> String {
        format!("Напоминание об устаревших бранчах {repository}")
    }

    fn notify_body(&self, ctx: &NotifyContext<'_>) -> String {
        let mut out = String::new();
        let _ = write!(out, "Добрый день, уважаемый коллега {}!\n\n", ctx.recipient);
        let _ = writeln!(
            out,
            "В проекте {} найдены ветки, в которые вы не делали коммиты целых {} дней!",
            ctx.repository, ctx.stale_days
        );
        out.push_str("Пожалуйста обновите (merge, rebase) или удалите эти ветки.\n");
        let heading = if ctx.branches.len() > 1 { "Ветки" } else { "Ветка" };
        let _ = writeln!(out, "{heading} {}:", ctx.branches_url);
        write_branch_lines(&mut out, ctx.branches, "последний коммит");
        out
    }

    fn delete_subject(&self, project: &str) -> String {
        format!("Уведомление об удалении устаревших бранчей {project}")
    }

    fn delete_body(&self, ctx: &DeleteContext<'_>) -> String {
        let mut out = String::new();
        let _ = write!(out, "Добрый день, уважаемый коллега {}!\n\n", ctx.recipient);
        let _ = writeln!(
            out,
            "В репозитории {} были найдены и удалены ветки, \
             в которые вы не делали коммиты целых {} дней!",
            ctx.branches_url, ctx.stale_days
        );
        let _ = writeln!(out, "Архив патчей удаленных веток находится тут: {}", ctx.archive_url);
        let heading = if ctx.branches.len() > 1 { "Ветки" } else { "Ветка" };
        let _ = writeln!(out, "{heading}:");
        write_branch_lines(&mut out, ctx.branches, "последний коммит");
        out
    }
}

/// English wording.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishTemplates;

impl Templates for EnglishTemplates {
    fn notify_subject(&self, repository: &str) -> String {
        format!("Stale branch reminder {repository}")
    }

    fn notify_body(&self, ctx: &NotifyContext<'_>) -> String {
        let mut out = String::new();
        let _ = write!(out, "Hello {}!\n\n", ctx.recipient);
        let _ = writeln!(
            out,
            "Project {} has branches you have not committed to for {} days.",
            ctx.repository, ctx.stale_days
        );
        out.push_str("Please update (merge, rebase) or delete them.\n");
        let heading = if ctx.branches.len() > 1 { "Branches" } else { "Branch" };
        let _ = writeln!(out, "{heading} {}:", ctx.branches_url);
        write_branch_lines(&mut out, ctx.branches, "last commit");
        out
    }

    fn delete_subject(&self, project: &str) -> String {
        format!("Stale branches deleted {project}")
    }

    fn delete_body(&self, ctx: &DeleteContext<'_>) -> String {
        let mut out = String::new();
        let _ = write!(out, "Hello {}!\n\n", ctx.recipient);
        let _ = writeln!(
            out,
            "Branches in {} without your commits for {} days were deleted.",
            ctx.branches_url, ctx.stale_days
        );
        let _ = writeln!(out, "Patches of deleted branches are archived at: {}", ctx.archive_url);
        let heading = if ctx.branches.len() > 1 { "Branches" } else { "Branch" };
        let _ = writeln!(out, "{heading}:");
        write_branch_lines(&mut out, ctx.branches, "last commit");
        out
    }
}

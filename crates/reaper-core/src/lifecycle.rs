//! Stale branch lifecycle orchestration.
//!
//! Two workflows share this service:
//! - notify: classify with the notify threshold, then remind each author
//!   once about all of their stale branches;
//! - delete: classify with the delete threshold, archive and delete each
//!   branch in turn, then tell each author which branches were removed.
//!
//! Per-branch and per-recipient failures are recorded in the returned
//! report and never stop the remaining work. Only a repository that cannot
//! be enumerated aborts a run.

use chrono::{DateTime, Local};
use reaper_git::{Author, GitOps};
use reaper_mail::{MailTransport, Notifier};
use tracing::{debug, info, warn};

use crate::archive::{ArchivedPatch, PatchArchive, archive_branch, archive_timestamp};
use crate::classify::{
    BranchInfo, Classification, IgnorePatterns, SkippedBranch, StaleThreshold, find_stale,
};
use crate::config::Config;
use crate::error::Result;
use crate::group::group_by_author;
use crate::identity::RepositoryIdentity;
use crate::template::{DeleteContext, NotifyContext, Templates, templates_for};

/// Everything the workflows need to know about their environment.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    pub default_branch: String,
    pub notify_days: u32,
    pub delete_days: u32,
    pub ignore: IgnorePatterns,
    pub notifier: String,
    pub remover: String,
    pub admin: String,
    pub archive_url: String,
}

impl LifecycleSettings {
    /// Extract workflow settings from a loaded configuration.
    ///
    /// # Errors
    /// Returns error if an ignore pattern does not compile.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            default_branch: config.repository.default_branch.clone(),
            notify_days: config.stale.notify_days,
            delete_days: config.stale.delete_days,
            ignore: config.ignore_patterns()?,
            notifier: config.mail.notifier.clone(),
            remover: config.mail.remover.clone(),
            admin: config.mail.admin.clone(),
            archive_url: config.repository.archive_url.clone().unwrap_or_default(),
        })
    }
}

/// Position of a branch in the delete workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    Candidate,
    Archiving,
    Archived,
    Deleting,
    Deleted,
    ArchiveFailed,
    DeleteFailed,
}

impl BranchState {
    /// Whether the branch ended in a failure state.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::ArchiveFailed | Self::DeleteFailed)
    }

    /// Whether the patch reached the archive.
    #[must_use]
    pub const fn is_archived(self) -> bool {
        matches!(
            self,
            Self::Archived | Self::Deleting | Self::Deleted | Self::DeleteFailed
        )
    }
}

/// Final state of one branch after the delete workflow.
#[derive(Debug, Clone)]
pub struct BranchOutcome {
    pub branch: BranchInfo,
    pub state: BranchState,
    pub archive: Option<ArchivedPatch>,
    pub error: Option<String>,
}

impl BranchOutcome {
    const fn new(branch: BranchInfo) -> Self {
        Self {
            branch,
            state: BranchState::Candidate,
            archive: None,
            error: None,
        }
    }

    fn enter(&mut self, state: BranchState) {
        debug!(branch = self.branch.short_name(), from = ?self.state, to = ?state, "transition");
        self.state = state;
    }

    fn fail(&mut self, state: BranchState, error: &reaper_git::Error) {
        warn!(branch = self.branch.short_name(), state = ?state, %error, "branch failed");
        self.enter(state);
        self.error = Some(error.to_string());
    }
}

/// How a message for one author was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The author received it.
    Author,
    /// Redirected to the admin after delivery to the author failed.
    Admin { error: String },
    /// Neither the author nor the admin could be reached.
    Failed { error: String, admin_error: String },
}

/// One message sent for one author group.
#[derive(Debug, Clone)]
pub struct NotificationOutcome {
    pub author: Author,
    /// Short names of the branches listed in the message.
    pub branches: Vec<String>,
    pub delivery: Delivery,
}

/// Counters printed at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub stale: usize,
    pub archived: usize,
    pub deleted: usize,
    pub notified: usize,
    pub redirected: usize,
    pub failed: usize,
}

impl Summary {
    fn count_notifications(&mut self, notifications: &[NotificationOutcome]) {
        for n in notifications {
            match n.delivery {
                Delivery::Author => self.notified += 1,
                Delivery::Admin { .. } => self.redirected += 1,
                Delivery::Failed { .. } => self.failed += 1,
            }
        }
    }

    /// Whether anything needs attention.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Result of the notify workflow.
#[derive(Debug, Default)]
pub struct NotifyReport {
    pub stale: Vec<BranchInfo>,
    pub skipped: Vec<SkippedBranch>,
    pub notifications: Vec<NotificationOutcome>,
}

impl NotifyReport {
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            stale: self.stale.len(),
            failed: self.skipped.len(),
            ..Summary::default()
        };
        summary.count_notifications(&self.notifications);
        summary
    }
}

/// Result of the delete workflow.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub branches: Vec<BranchOutcome>,
    pub skipped: Vec<SkippedBranch>,
    pub notifications: Vec<NotificationOutcome>,
}

impl DeleteReport {
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            stale: self.branches.len(),
            failed: self.skipped.len(),
            ..Summary::default()
        };
        for outcome in &self.branches {
            if outcome.state.is_archived() {
                summary.archived += 1;
            }
            if outcome.state == BranchState::Deleted {
                summary.deleted += 1;
            }
            if outcome.state.is_failure() {
                summary.failed += 1;
            }
        }
        summary.count_notifications(&self.notifications);
        summary
    }

    /// Branches that were archived and deleted.
    pub fn deleted(&self) -> impl Iterator<Item = &BranchInfo> {
        self.branches
            .iter()
            .filter(|o| o.state == BranchState::Deleted)
            .map(|o| &o.branch)
    }
}

/// Service running the lifecycle workflows against one repository.
pub struct LifecycleService<'a, G: GitOps, T: MailTransport> {
    repo: &'a G,
    notifier: &'a Notifier<T>,
    settings: LifecycleSettings,
    templates: Box<dyn Templates>,
}

impl<'a, G: GitOps, T: MailTransport> LifecycleService<'a, G, T> {
    /// Create a service using the templates of `config.mail.language`.
    ///
    /// # Errors
    /// Returns error if the configuration cannot be turned into settings.
    pub fn from_config(repo: &'a G, notifier: &'a Notifier<T>, config: &Config) -> Result<Self> {
        Ok(Self::new(repo, notifier, LifecycleSettings::from_config(config)?)
            .with_templates(templates_for(config.mail.language)))
    }

    /// Create a service with the default (Russian) templates.
    #[must_use]
    pub fn new(repo: &'a G, notifier: &'a Notifier<T>, settings: LifecycleSettings) -> Self {
        Self {
            repo,
            notifier,
            settings,
            templates: templates_for(crate::template::Language::default()),
        }
    }

    /// Replace the message templates.
    #[must_use]
    pub fn with_templates(mut self, templates: Box<dyn Templates>) -> Self {
        self.templates = templates;
        self
    }

    /// Classify remote branches against a threshold of `days`.
    ///
    /// # Errors
    /// Returns error if the repository cannot be enumerated.
    pub fn list(&self, now: &DateTime<Local>, days: u32) -> Result<Classification> {
        find_stale(
            self.repo,
            &self.settings.ignore,
            StaleThreshold::days_before(now, days),
        )
    }

    /// Branches the delete workflow would act on, without touching anything.
    ///
    /// # Errors
    /// Returns error if the repository cannot be enumerated.
    pub fn plan_deletion(&self, now: &DateTime<Local>) -> Result<Classification> {
        self.list(now, self.settings.delete_days)
    }

    /// Remind authors about their stale branches.
    ///
    /// # Errors
    /// Returns error if the repository cannot be enumerated.
    pub fn notify_stale(&self, now: &DateTime<Local>) -> Result<NotifyReport> {
        let (identity, url) = self.origin()?;
        let classification = self.list(now, self.settings.notify_days)?;
        info!(stale = classification.stale.len(), "notify: classified");

        let branches_url = web_url(&identity, &url);
        let repository = display_name(&identity.repo, &url);
        let subject = self.templates.notify_subject(repository);

        let mut notifications = Vec::new();
        for (author, branches) in group_by_author(classification.stale.iter().cloned()) {
            let body = self.templates.notify_body(&NotifyContext {
                recipient: &author.name,
                repository,
                branches_url: &branches_url,
                stale_days: self.settings.notify_days,
                branches: &branches,
            });
            let delivery = self.deliver(&self.settings.notifier, &author, &subject, &body);
            notifications.push(NotificationOutcome {
                branches: short_names(&branches),
                author,
                delivery,
            });
        }

        Ok(NotifyReport {
            stale: classification.stale,
            skipped: classification.skipped,
            notifications,
        })
    }

    /// Archive, delete and announce branches past the delete threshold.
    ///
    /// # Errors
    /// Returns error if the repository cannot be enumerated.
    pub fn delete_stale<A>(&self, archive: &A, now: &DateTime<Local>) -> Result<DeleteReport>
    where
        A: PatchArchive + ?Sized,
    {
        let (identity, url) = self.origin()?;
        let classification = self.plan_deletion(now)?;
        info!(stale = classification.stale.len(), "delete: classified");

        let branches: Vec<BranchOutcome> = classification
            .stale
            .into_iter()
            .map(|info| self.reap(archive, &identity, info))
            .collect();

        let mut report = DeleteReport {
            branches,
            skipped: classification.skipped,
            notifications: Vec::new(),
        };

        let branches_url = web_url(&identity, &url);
        let archive_url = web_url(
            &RepositoryIdentity::parse(&self.settings.archive_url),
            &self.settings.archive_url,
        );
        let subject = self
            .templates
            .delete_subject(display_name(&identity.project, &url));

        let groups = group_by_author(report.deleted().cloned());
        for (author, branches) in groups {
            let body = self.templates.delete_body(&DeleteContext {
                recipient: &author.name,
                branches_url: &branches_url,
                archive_url: &archive_url,
                stale_days: self.settings.delete_days,
                branches: &branches,
            });
            let delivery = self.deliver(&self.settings.remover, &author, &subject, &body);
            report.notifications.push(NotificationOutcome {
                branches: short_names(&branches),
                author,
                delivery,
            });
        }

        Ok(report)
    }

    fn origin(&self) -> Result<(RepositoryIdentity, String)> {
        let url = self.repo.remote_origin_url()?;
        let identity = RepositoryIdentity::parse(&url);
        if identity.is_empty() {
            debug!(url, "origin url not recognized, messages will lack repository links");
        }
        Ok((identity, url))
    }

    /// Move one branch through archive and delete.
    fn reap<A>(&self, archive: &A, identity: &RepositoryIdentity, info: BranchInfo) -> BranchOutcome
    where
        A: PatchArchive + ?Sized,
    {
        let mut outcome = BranchOutcome::new(info);

        outcome.enter(BranchState::Archiving);
        let timestamp = archive_timestamp(&Local::now());
        match archive_branch(
            self.repo,
            archive,
            identity,
            &outcome.branch,
            &self.settings.default_branch,
            &timestamp,
        ) {
            Ok(patch) => {
                outcome.archive = Some(patch);
                outcome.enter(BranchState::Archived);
            }
            Err(e) => {
                outcome.fail(BranchState::ArchiveFailed, &e);
                return outcome;
            }
        }

        outcome.enter(BranchState::Deleting);
        let name = outcome.branch.short_name().to_string();
        match self.repo.delete_remote_branch(&name) {
            Ok(()) => {
                info!(branch = %name, "deleted");
                outcome.enter(BranchState::Deleted);
            }
            Err(e) => outcome.fail(BranchState::DeleteFailed, &e),
        }
        outcome
    }

    /// Send to the author, falling back to the admin with the error appended.
    fn deliver(&self, sender: &str, author: &Author, subject: &str, body: &str) -> Delivery {
        let Err(e) = self
            .notifier
            .send(sender, std::slice::from_ref(&author.email), subject, body)
        else {
            return Delivery::Author;
        };

        let error = e.to_string();
        warn!(author = %author.email, %error, "redirecting notification to admin");
        let fallback = format!("{body}\n{error}");
        match self.notifier.send(
            sender,
            std::slice::from_ref(&self.settings.admin),
            subject,
            &fallback,
        ) {
            Ok(()) => Delivery::Admin { error },
            Err(admin_error) => {
                warn!(admin = %self.settings.admin, error = %admin_error, "admin unreachable");
                Delivery::Failed {
                    error,
                    admin_error: admin_error.to_string(),
                }
            }
        }
    }
}

/// Part of the identity used in subjects, or the whole URL when unparsed.
fn display_name<'s>(part: &'s str, url: &'s str) -> &'s str {
    if part.is_empty() { url } else { part }
}

/// Branch list page, or the raw URL when it has no recognizable shape.
fn web_url(identity: &RepositoryIdentity, url: &str) -> String {
    if identity.is_empty() {
        url.to_string()
    } else {
        identity.branches_url()
    }
}

fn short_names(branches: &[BranchInfo]) -> Vec<String> {
    branches.iter().map(|b| b.short_name().to_string()).collect()
}

//! Stale branch classification.
//!
//! A branch is stale when its most recent commit is strictly older than a
//! threshold. Branches whose full ref name fully matches an ignore pattern
//! are never considered.

use chrono::{DateTime, Days, TimeZone};
use regex::Regex;
use reaper_git::{BranchRef, CommitMeta, GitOps};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A remote branch paired with its last commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    /// The remote-tracking reference.
    pub branch: BranchRef,
    /// Most recent commit reachable from the reference.
    pub last_commit: CommitMeta,
}

impl BranchInfo {
    /// Branch name without the remote-tracking prefix.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.branch.short_name()
    }
}

/// Point in time before which a last commit counts as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StaleThreshold(i64);

impl StaleThreshold {
    /// Threshold at an exact epoch second.
    #[must_use]
    pub const fn from_epoch_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Threshold `days` calendar days before `now`, in `now`'s time zone.
    #[must_use]
    pub fn days_before<Tz: TimeZone>(now: &DateTime<Tz>, days: u32) -> Self {
        now.clone()
            .checked_sub_days(Days::new(u64::from(days)))
            .map_or(Self(i64::MIN), |t| Self(t.timestamp()))
    }

    /// The threshold as epoch seconds.
    #[must_use]
    pub const fn epoch_seconds(self) -> i64 {
        self.0
    }

    /// Whether a commit made at `commit_time` is older than the threshold.
    #[must_use]
    pub const fn is_stale(self, commit_time: i64) -> bool {
        commit_time < self.0
    }
}

/// Full-match regular expressions over full ref names.
#[derive(Debug, Clone, Default)]
pub struct IgnorePatterns {
    patterns: Vec<Regex>,
}

impl IgnorePatterns {
    /// Compile patterns; each must match a whole ref name to ignore it.
    ///
    /// # Errors
    /// Returns error naming the first pattern that fails to compile.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(&format!("^(?:{p})$")).map_err(|source| Error::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Whether `ref_name` is fully matched by any pattern.
    #[must_use]
    pub fn is_ignored(&self, ref_name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(ref_name))
    }
}

/// A branch whose commit could not be resolved.
#[derive(Debug)]
pub struct SkippedBranch {
    /// The unresolved reference.
    pub branch: BranchRef,
    /// Why it was skipped.
    pub error: reaper_git::Error,
}

/// Result of classifying a set of branches.
#[derive(Debug, Default)]
pub struct Classification {
    /// Stale branches, in input order.
    pub stale: Vec<BranchInfo>,
    /// Branches skipped because an object could not be resolved.
    pub skipped: Vec<SkippedBranch>,
}

/// Select the stale branches among `branches`.
///
/// Errors meaning the repository itself is unreadable (including a branch
/// without any commit) are returned; a branch whose objects cannot be
/// resolved is reported in [`Classification::skipped`] instead.
///
/// # Errors
/// Returns error if the repository cannot be read.
pub fn classify_stale<G: GitOps>(
    repo: &G,
    branches: &[BranchRef],
    ignore: &IgnorePatterns,
    threshold: StaleThreshold,
) -> Result<Classification> {
    let mut result = Classification::default();

    for branch in branches {
        if ignore.is_ignored(&branch.name) {
            debug!(branch = %branch.name, "ignored");
            continue;
        }

        let last_commit = match repo.last_commit_of(branch) {
            Ok(commit) => commit,
            Err(e) if e.is_repository_access() => return Err(e.into()),
            Err(e) => {
                warn!(branch = %branch.name, error = %e, "skipping unresolvable branch");
                result.skipped.push(SkippedBranch {
                    branch: branch.clone(),
                    error: e,
                });
                continue;
            }
        };

        if threshold.is_stale(last_commit.time) {
            result.stale.push(BranchInfo {
                branch: branch.clone(),
                last_commit,
            });
        }
    }

    Ok(result)
}

/// List remote branches and classify them.
///
/// # Errors
/// Returns error if the branch list or any commit graph cannot be read.
pub fn find_stale<G: GitOps>(
    repo: &G,
    ignore: &IgnorePatterns,
    threshold: StaleThreshold,
) -> Result<Classification> {
    let branches = repo.list_remote_branches()?;
    debug!(count = branches.len(), "listed remote branches");
    classify_stale(repo, &branches, ignore, threshold)
}

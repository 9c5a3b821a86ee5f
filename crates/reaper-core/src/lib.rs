//! # reaper-core
//!
//! Stale branch lifecycle engine for branch-reaper.
//!
//! The engine classifies remote branches by the age of their last commit,
//! groups them by author, archives each branch as a patch in a separate
//! repository before deleting it, and notifies the authors.

pub mod archive;
pub mod classify;
pub mod config;
pub mod error;
pub mod group;
pub mod identity;
pub mod lifecycle;
pub mod template;

#[cfg(test)]
mod test_mocks;

pub use archive::{ArchivedPatch, GitPatchArchive, PatchArchive, archive_branch};
pub use classify::{
    BranchInfo, Classification, IgnorePatterns, SkippedBranch, StaleThreshold, classify_stale,
    find_stale,
};
pub use config::Config;
pub use error::{Error, Result};
pub use group::{AuthorGroups, group_by_author};
pub use identity::RepositoryIdentity;
pub use lifecycle::{
    BranchOutcome, BranchState, DeleteReport, Delivery, LifecycleService, LifecycleSettings,
    NotificationOutcome, NotifyReport, Summary,
};
pub use template::{EnglishTemplates, Language, RussianTemplates, Templates};

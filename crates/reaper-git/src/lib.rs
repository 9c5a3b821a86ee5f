//! # reaper-git
//!
//! Repository access layer for branch-reaper, built on git2-rs.
//! Exposes only what the stale-branch lifecycle needs: remote branch
//! listing, last-commit lookup, tree diffs, merge-bases, remote branch
//! deletion and single-file orphan commits.

mod error;
mod repository;
mod settings;
mod traits;
mod types;

pub use error::{Error, Result};
pub use git2::Oid;
pub use repository::{ORIGIN, Repository};
pub use settings::GitSettings;
pub use traits::GitOps;
pub use types::{Author, BranchRef, CommitMeta, REMOTE_PREFIX};

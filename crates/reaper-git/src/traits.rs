//! Trait abstractions for git operations.
//!
//! This module defines the `GitOps` trait which captures exactly the
//! operations the stale-branch lifecycle needs, enabling dependency
//! injection and testability.

use git2::Oid;

use crate::{BranchRef, CommitMeta, Result};

/// Trait for repository operations used by the lifecycle engine.
///
/// This trait abstracts git operations, allowing for:
/// - Dependency injection in the classifier, archiver and orchestrator
/// - Mock implementations for testing
///
/// Note: operations are synchronous since git2 is a synchronous library.
#[allow(clippy::missing_errors_doc)]
pub trait GitOps {
    // === Read operations ===

    /// List all remote-tracking branches, sorted by full ref name.
    fn list_remote_branches(&self) -> Result<Vec<BranchRef>>;

    /// Get the most recent commit reachable from a branch tip.
    fn last_commit_of(&self, branch: &BranchRef) -> Result<CommitMeta>;

    /// Unified patch of the tree-to-tree diff from `base` to `target`.
    ///
    /// The patch is raw bytes: file contents are not required to be UTF-8.
    fn diff(&self, base: &str, target: &str) -> Result<Vec<u8>>;

    /// Lowest common ancestor of two revisions, `None` if unrelated.
    fn merge_base(&self, one: &str, two: &str) -> Result<Option<Oid>>;

    /// URL of the `origin` remote.
    fn remote_origin_url(&self) -> Result<String>;

    // === Write operations ===

    /// Delete a branch on `origin` along with its local tracking ref.
    ///
    /// `name` is the branch name without any ref prefix.
    fn delete_remote_branch(&self, name: &str) -> Result<()>;

    /// Commit a single file onto a new parentless branch and push it to `origin`.
    fn commit_orphan_file(&self, branch: &str, file_name: &str, content: &[u8]) -> Result<Oid>;
}

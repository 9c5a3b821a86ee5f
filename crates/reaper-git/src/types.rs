//! Value types returned by repository operations.

use git2::Oid;

/// Prefix of remote-tracking refs for the `origin` remote.
pub const REMOTE_PREFIX: &str = "refs/remotes/origin/";

/// A remote-tracking branch reference at query time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchRef {
    /// Full ref name, e.g. `refs/remotes/origin/feature/login`.
    pub name: String,
    /// Commit the ref points at.
    pub target: Oid,
}

impl BranchRef {
    /// Create a new branch reference.
    #[must_use]
    pub fn new(name: impl Into<String>, target: Oid) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    /// Branch name without the `refs/remotes/origin/` prefix.
    ///
    /// Names outside the origin namespace are returned unchanged.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix(REMOTE_PREFIX).unwrap_or(&self.name)
    }
}

/// Identity of a commit author.
///
/// Equality is structural on name and email, so the same person resolved
/// from two different commits compares equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Author {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl Author {
    /// Create an author identity.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Metadata of a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMeta {
    /// Commit id.
    pub id: Oid,
    /// Commit author.
    pub author: Author,
    /// Commit time in epoch seconds.
    pub time: i64,
    /// First line of the commit message.
    pub summary: String,
}

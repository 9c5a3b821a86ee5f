//! Error types for reaper-git.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not inside a git repository.
    #[error("not a git repository: {0}")]
    NotARepository(String),

    /// The ref database or commit graph could not be read.
    #[error("cannot read repository: {0}")]
    RepositoryAccess(String),

    /// A branch has no reachable commits.
    #[error("commits not found, branch: {0}")]
    NoCommits(String),

    /// An object is missing or has an unexpected type.
    #[error("cannot resolve object {spec}: {message}")]
    ObjectResolution {
        /// The revision or ref being resolved.
        spec: String,
        /// Underlying git message.
        message: String,
    },

    /// Remote not found.
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// The remote declined a push or delete.
    #[error("push rejected: {0}")]
    PushRejected(String),

    /// Filesystem error while preparing a working directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}

impl Error {
    /// Whether this error means the repository itself is unreadable.
    ///
    /// Such errors make every downstream decision untrustworthy and should
    /// abort the whole run rather than a single branch.
    #[must_use]
    pub const fn is_repository_access(&self) -> bool {
        matches!(
            self,
            Self::NotARepository(_) | Self::RepositoryAccess(_) | Self::NoCommits(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_access_classification() {
        assert!(Error::RepositoryAccess("refs".into()).is_repository_access());
        assert!(Error::NoCommits("refs/remotes/origin/x".into()).is_repository_access());
        assert!(!Error::PushRejected("denied".into()).is_repository_access());
        assert!(
            !Error::ObjectResolution {
                spec: "origin/x".into(),
                message: "bad object".into(),
            }
            .is_repository_access()
        );
    }

    #[test]
    fn test_push_rejected_keeps_remote_message() {
        let err = Error::PushRejected("refs/heads/x: pre-receive hook declined".into());
        assert_eq!(
            err.to_string(),
            "push rejected: refs/heads/x: pre-receive hook declined"
        );
    }
}

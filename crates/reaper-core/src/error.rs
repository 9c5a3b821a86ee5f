//! Error types for reaper-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in reaper-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An ignore pattern is not a valid regular expression.
    #[error("invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as configured.
        pattern: String,
        /// Why it failed to compile.
        #[source]
        source: regex::Error,
    },

    /// Configuration values contradict each other or are missing.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file parsing error.
    #[error("failed to parse {file}: {message}")]
    ConfigParse { file: PathBuf, message: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Git operation error.
    #[error("git error: {0}")]
    Git(#[from] reaper_git::Error),

    /// Mail delivery error.
    #[error("mail error: {0}")]
    Mail(#[from] reaper_mail::Error),
}

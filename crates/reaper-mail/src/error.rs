//! Error types for reaper-mail.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while sending mail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Some recipients were refused; the rest may still be deliverable.
    #[error("invalid recipient addresses [{}]: {message}", invalid.join(", "))]
    InvalidRecipients {
        /// Addresses that were refused.
        invalid: Vec<String>,
        /// Transport message describing the refusal.
        message: String,
    },

    /// The message has nobody to go to.
    #[error("no recipients")]
    NoRecipients,

    /// The sender address is malformed.
    #[error("invalid sender address: {0}")]
    InvalidSender(String),

    /// The transport failed to deliver the message.
    #[error("mail transport failed: {0}")]
    Transport(String),

    /// IO error talking to the transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

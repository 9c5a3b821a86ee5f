//! Trait abstractions for mail delivery.
//!
//! This module defines the `MailTransport` trait which abstracts how a
//! rendered message leaves the process, enabling dependency injection
//! and testability.

use crate::{Email, Result};

/// Trait for mail delivery.
///
/// This trait abstracts the transport, allowing for:
/// - Dependency injection in the lifecycle orchestrator
/// - Mock implementations for testing
/// - Alternative implementations (e.g., an SMTP relay client)
///
/// Implementations that can tell which recipients were refused should
/// report them with [`crate::Error::InvalidRecipients`] so the notifier
/// can retry without them.
pub trait MailTransport {
    /// Deliver a single message to all of its recipients.
    ///
    /// # Errors
    /// Returns error if the message could not be handed to the transport.
    fn send(&self, email: &Email) -> Result<()>;
}

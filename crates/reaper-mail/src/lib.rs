//! # reaper-mail
//!
//! Email notification for branch-reaper: the [`MailTransport`] seam, a
//! sendmail-backed transport and the [`Notifier`] retry policy.

mod error;
mod notifier;
mod sendmail;
mod traits;
mod types;

pub use error::{Error, Result};
pub use notifier::Notifier;
pub use sendmail::{DEFAULT_SENDMAIL, SendmailTransport, is_valid_address};
pub use traits::MailTransport;
pub use types::Email;

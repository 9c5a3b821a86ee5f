//! Notification delivery with a single retry after invalid addresses.

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::traits::MailTransport;
use crate::types::Email;

/// Sends plain-text notifications through a [`MailTransport`].
#[derive(Debug)]
pub struct Notifier<T: MailTransport> {
    transport: T,
}

impl<T: MailTransport> Notifier<T> {
    /// Create a notifier over a transport.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Get the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Send one message to all recipients.
    ///
    /// If the transport refuses some addresses and names them, the message
    /// is sent once more without those addresses.
    ///
    /// # Errors
    /// Returns the transport error if the first attempt fails for any other
    /// reason, or the error of the retried attempt.
    pub fn send(
        &self,
        sender: &str,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<()> {
        let email = Email::new(sender, recipients.to_vec(), subject, body);
        info!(to = ?email.to, "sending notification");

        match self.transport.send(&email) {
            Err(Error::InvalidRecipients { invalid, message }) => {
                warn!(?invalid, %message, "retrying without invalid addresses");
                self.transport.send(&email.without_recipients(&invalid))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Transport replaying scripted results and recording every attempt.
    #[derive(Default)]
    struct ScriptedTransport {
        results: RefCell<VecDeque<Result<()>>>,
        sent: RefCell<Vec<Email>>,
    }

    impl ScriptedTransport {
        fn with_results(results: Vec<Result<()>>) -> Self {
            Self {
                results: RefCell::new(results.into()),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl MailTransport for ScriptedTransport {
        fn send(&self, email: &Email) -> Result<()> {
            self.sent.borrow_mut().push(email.clone());
            self.results.borrow_mut().pop_front().unwrap_or(Ok(()))
        }
    }

    fn recipients(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_send_success_single_attempt() {
        let notifier = Notifier::new(ScriptedTransport::default());
        notifier
            .send("bot@example.com", &recipients(&["jane@example.com"]), "s", "b")
            .unwrap();

        let sent = notifier.transport().sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["jane@example.com"]);
        assert_eq!(sent[0].from, "bot@example.com");
    }

    #[test]
    fn test_retry_without_invalid_addresses() {
        let notifier = Notifier::new(ScriptedTransport::with_results(vec![Err(
            Error::InvalidRecipients {
                invalid: vec!["gone@example.com".into()],
                message: "550 user unknown".into(),
            },
        )]));

        notifier
            .send(
                "bot@example.com",
                &recipients(&["jane@example.com", "gone@example.com"]),
                "subject",
                "body",
            )
            .unwrap();

        let sent = notifier.transport().sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].to, vec!["jane@example.com"]);
        assert_eq!(sent[1].body, "body");
    }

    #[test]
    fn test_failed_retry_propagates() {
        let notifier = Notifier::new(ScriptedTransport::with_results(vec![
            Err(Error::InvalidRecipients {
                invalid: vec!["gone@example.com".into()],
                message: "550 user unknown".into(),
            }),
            Err(Error::NoRecipients),
        ]));

        let err = notifier
            .send("bot@example.com", &recipients(&["gone@example.com"]), "s", "b")
            .unwrap_err();
        assert!(matches!(err, Error::NoRecipients));
        assert_eq!(notifier.transport().sent.borrow().len(), 2);
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let notifier = Notifier::new(ScriptedTransport::with_results(vec![Err(
            Error::Transport("connection refused".into()),
        )]));

        let err = notifier
            .send("bot@example.com", &recipients(&["jane@example.com"]), "s", "b")
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(notifier.transport().sent.borrow().len(), 1);
    }
}

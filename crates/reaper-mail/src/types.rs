//! Mail message types.

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// Sender address.
    pub from: String,

    /// Recipient addresses.
    pub to: Vec<String>,

    /// Subject line.
    pub subject: String,

    /// Plain-text body.
    pub body: String,
}

impl Email {
    /// Create a new message.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: Vec<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to,
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Copy of this message with the given recipients removed.
    #[must_use]
    pub fn without_recipients(&self, removed: &[String]) -> Self {
        Self {
            to: self
                .to
                .iter()
                .filter(|addr| !removed.contains(addr))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

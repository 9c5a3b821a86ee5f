//! Delivery through a sendmail-compatible command.

use std::ffi::OsString;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::MailTransport;
use crate::types::Email;

/// Default location of the sendmail binary.
pub const DEFAULT_SENDMAIL: &str = "/usr/sbin/sendmail";

static ADDRESS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"^[^@\s<>(),;:"\[\]]+@[^@\s<>(),;:"\[\]]+$"#).ok());

/// Check that an address has the `local@domain` shape.
#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS
        .as_ref()
        .is_some_and(|re| re.is_match(address.trim()))
}

/// Transport piping RFC 5322 messages into a sendmail-compatible command.
///
/// Recipients are validated before the command is spawned; malformed ones
/// are reported as [`Error::InvalidRecipients`].
#[derive(Debug, Clone)]
pub struct SendmailTransport {
    program: PathBuf,
    args: Vec<OsString>,
}

impl SendmailTransport {
    /// Create a transport invoking `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra arguments placed before the envelope arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for SendmailTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SENDMAIL)
    }
}

impl MailTransport for SendmailTransport {
    fn send(&self, email: &Email) -> Result<()> {
        if !is_valid_address(&email.from) {
            return Err(Error::InvalidSender(email.from.clone()));
        }

        let invalid: Vec<String> = email
            .to
            .iter()
            .filter(|addr| !is_valid_address(addr))
            .cloned()
            .collect();
        if !invalid.is_empty() {
            return Err(Error::InvalidRecipients {
                invalid,
                message: "address failed validation".into(),
            });
        }
        if email.to.is_empty() {
            return Err(Error::NoRecipients);
        }

        let message = render(email, &chrono::Local::now().to_rfc2822());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("-i")
            .arg("-f")
            .arg(&email.from)
            .arg("--")
            .args(&email.to)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        // The child is reaped even when it stops reading early.
        let written = child
            .stdin
            .take()
            .map_or(Ok(()), |mut stdin| stdin.write_all(message.as_bytes()));

        let output = child.wait_with_output()?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if let Err(e) = written {
            return Err(Error::Transport(format!(
                "cannot write message to {}: {e}: {}",
                self.program.display(),
                stderr.trim()
            )));
        }
        if !output.status.success() {
            return Err(Error::Transport(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        debug!(to = ?email.to, subject = %email.subject, "mail handed to sendmail");
        Ok(())
    }
}

/// Render a message as UTF-8 plain text with RFC 2047 encoded subject.
fn render(email: &Email, date: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "From: {}", email.from);
    let _ = writeln!(out, "To: {}", email.to.join(", "));
    let _ = writeln!(out, "Subject: {}", encode_header(&email.subject));
    let _ = writeln!(out, "Date: {date}");
    out.push_str("MIME-Version: 1.0\n");
    out.push_str("Content-Type: text/plain; charset=UTF-8\n");
    out.push_str("Content-Transfer-Encoding: 8bit\n\n");
    out.push_str(&email.body);
    if !email.body.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

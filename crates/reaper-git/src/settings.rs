//! Commit identity and transport authentication.

use std::path::PathBuf;

use git2::{CertificateCheckStatus, Cred, CredentialType, RemoteCallbacks, Signature};
use secrecy::{ExposeSecret, SecretString};

/// libgit2 keeps asking for credentials while authentication fails.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Settings shared by every repository the engine touches.
#[derive(Debug, Clone)]
pub struct GitSettings {
    /// Author and committer name of synthetic commits.
    pub username: String,
    /// Author and committer email of synthetic commits.
    pub email: String,
    /// Private key used for SSH transports.
    pub ssh_key_path: Option<PathBuf>,
    /// Passphrase of the private key, if it is encrypted.
    pub ssh_passphrase: Option<SecretString>,
}

impl GitSettings {
    /// Settings with an identity and no explicit SSH key.
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            ssh_key_path: None,
            ssh_passphrase: None,
        }
    }

    /// Use an explicit private key for SSH transports.
    #[must_use]
    pub fn with_ssh_key(
        mut self,
        path: impl Into<PathBuf>,
        passphrase: Option<SecretString>,
    ) -> Self {
        self.ssh_key_path = Some(path.into());
        self.ssh_passphrase = passphrase;
        self
    }

    /// Signature stamped on synthetic commits.
    ///
    /// # Errors
    /// Returns error if the name or email is rejected by libgit2.
    pub fn signature(&self) -> Result<Signature<'static>, git2::Error> {
        Signature::now(&self.username, &self.email)
    }

    /// Build remote callbacks that authenticate network operations.
    ///
    /// With an explicit key, host key verification is skipped, matching an
    /// `StrictHostKeyChecking=no` SSH session. Without one, the SSH agent and
    /// default credential helpers are used.
    #[must_use]
    pub fn remote_callbacks<'a>(&self) -> RemoteCallbacks<'a> {
        let mut callbacks = RemoteCallbacks::new();
        let mut attempts = 0_usize;
        let key_path = self.ssh_key_path.clone();
        let passphrase = self
            .ssh_passphrase
            .as_ref()
            .map(|p| p.expose_secret().to_owned());
        let has_key = key_path.is_some();

        callbacks.credentials(move |_url, username_from_url, allowed| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str("authentication failed"));
            }

            let user = username_from_url.unwrap_or("git");
            match &key_path {
                Some(path) if allowed.contains(CredentialType::SSH_KEY) => {
                    Cred::ssh_key(user, None, path, passphrase.as_deref())
                }
                None if allowed.contains(CredentialType::SSH_KEY) => Cred::ssh_key_from_agent(user),
                _ if allowed.contains(CredentialType::USERNAME) => Cred::username(user),
                _ => Cred::default(),
            }
        });

        if has_key {
            callbacks.certificate_check(|_cert, _host| Ok(CertificateCheckStatus::CertificateOk));
        }

        callbacks
    }
}

//! Configuration management for branch-reaper.

use std::fs;
use std::path::{Path, PathBuf};

use reaper_git::GitSettings;
use secrecy::SecretString;
use serde::Deserialize;

use crate::classify::IgnorePatterns;
use crate::error::{Error, Result};
use crate::template::Language;

/// Configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Repository and archive settings.
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Staleness thresholds.
    #[serde(default)]
    pub stale: StaleConfig,

    /// Identity and transport for git operations.
    #[serde(default)]
    pub git: GitConfig,

    /// Notification settings.
    #[serde(default)]
    pub mail: MailConfig,
}

impl Config {
    /// Load config from a TOML file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Check invariants the engine relies on but does not enforce itself.
    ///
    /// # Errors
    /// Returns error if branches could be deleted before their authors were
    /// warned, or if an ignore pattern does not compile.
    pub fn validate(&self) -> Result<()> {
        if self.stale.delete_days < self.stale.notify_days {
            return Err(Error::InvalidConfig(format!(
                "stale.delete_days ({}) must not be less than stale.notify_days ({})",
                self.stale.delete_days, self.stale.notify_days
            )));
        }
        self.ignore_patterns()?;
        Ok(())
    }

    /// Compile the configured ignore patterns.
    ///
    /// # Errors
    /// Returns error if a pattern is not a valid regular expression.
    pub fn ignore_patterns(&self) -> Result<IgnorePatterns> {
        IgnorePatterns::new(&self.repository.ignore_patterns)
    }

    /// Archive repository URL, required by the delete workflow.
    ///
    /// # Errors
    /// Returns error if no archive repository is configured.
    pub fn archive_url(&self) -> Result<&str> {
        self.repository
            .archive_url
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig("repository.archive_url is not set".into()))
    }

    /// Git identity and transport settings.
    #[must_use]
    pub fn git_settings(&self) -> GitSettings {
        let settings = GitSettings::new(&self.git.username, &self.git.email);
        match &self.git.ssh_key_path {
            Some(path) => settings.with_ssh_key(path, self.git.ssh_passphrase.clone()),
            None => settings,
        }
    }
}

/// Repository settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    /// Working copy of the audited repository.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,

    /// Revision branches are diffed against.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Repository receiving patches of deleted branches.
    #[serde(default)]
    pub archive_url: Option<String>,

    /// Full-match regular expressions of ref names never touched.
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            workdir: default_workdir(),
            default_branch: default_branch(),
            archive_url: None,
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

fn default_branch() -> String {
    "origin/master".into()
}

fn default_ignore_patterns() -> Vec<String> {
    [
        "^refs/remotes/origin/dev$",
        "^refs/remotes/origin/master$",
        "^refs/remotes/origin/HEAD$",
        "^refs/remotes/origin/release/.*$",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Staleness thresholds in days.
#[derive(Debug, Clone, Deserialize)]
pub struct StaleConfig {
    /// Days without commits before authors are reminded.
    #[serde(default = "default_notify_days")]
    pub notify_days: u32,

    /// Days without commits before a branch is archived and deleted.
    #[serde(default = "default_delete_days")]
    pub delete_days: u32,
}

impl Default for StaleConfig {
    fn default() -> Self {
        Self {
            notify_days: default_notify_days(),
            delete_days: default_delete_days(),
        }
    }
}

const fn default_notify_days() -> u32 {
    30
}

const fn default_delete_days() -> u32 {
    60
}

/// Identity of synthetic commits and SSH credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct GitConfig {
    /// Commit author name.
    #[serde(default = "default_git_username")]
    pub username: String,

    /// Commit author email.
    #[serde(default = "default_git_email")]
    pub email: String,

    /// Private key for SSH remotes.
    #[serde(default)]
    pub ssh_key_path: Option<PathBuf>,

    /// Passphrase of the private key.
    #[serde(default)]
    pub ssh_passphrase: Option<SecretString>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            username: default_git_username(),
            email: default_git_email(),
            ssh_key_path: None,
            ssh_passphrase: None,
        }
    }
}

fn default_git_username() -> String {
    "branch-reaper".into()
}

fn default_git_email() -> String {
    "branch-reaper@localhost".into()
}

/// Notification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Sender of stale-branch reminders.
    #[serde(default = "default_notifier")]
    pub notifier: String,

    /// Sender of deletion notices.
    #[serde(default = "default_remover")]
    pub remover: String,

    /// Recipient of messages that could not reach their author.
    #[serde(default = "default_admin")]
    pub admin: String,

    /// Sendmail-compatible program.
    #[serde(default = "default_sendmail")]
    pub sendmail: PathBuf,

    /// Extra arguments for the sendmail program.
    #[serde(default)]
    pub sendmail_args: Vec<String>,

    /// Language of message templates.
    #[serde(default)]
    pub language: Language,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            notifier: default_notifier(),
            remover: default_remover(),
            admin: default_admin(),
            sendmail: default_sendmail(),
            sendmail_args: Vec::new(),
            language: Language::default(),
        }
    }
}

fn default_notifier() -> String {
    "stale-branch-notifier@localhost".into()
}

fn default_remover() -> String {
    "stale-branch-delete@localhost".into()
}

fn default_admin() -> String {
    "root@localhost".into()
}

fn default_sendmail() -> PathBuf {
    PathBuf::from(reaper_mail::DEFAULT_SENDMAIL)
}

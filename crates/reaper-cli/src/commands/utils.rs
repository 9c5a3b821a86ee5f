use std::path::Path;

use anyhow::{Context, Result};
use reaper_core::{Config, Summary};
use reaper_git::Repository;
use reaper_mail::{Notifier, SendmailTransport};

use crate::output;

/// Helper to load and validate the config and open the audited repository.
pub fn open_repo_and_config(config_path: &Path) -> Result<(Repository, Config)> {
    let config = Config::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    config.validate()?;

    let workdir = &config.repository.workdir;
    let repo = Repository::open(workdir, config.git_settings())
        .with_context(|| format!("Cannot open repository at {}", workdir.display()))?;

    Ok((repo, config))
}

/// Notifier delivering through the configured sendmail command.
pub fn notifier(config: &Config) -> Notifier<SendmailTransport> {
    let transport =
        SendmailTransport::new(&config.mail.sendmail).with_args(&config.mail.sendmail_args);
    Notifier::new(transport)
}

/// Print the end-of-run counters.
pub fn print_summary(summary: &Summary) {
    output::hr();
    output::info(&format!(
        "stale: {}, archived: {}, deleted: {}, notified: {}, redirected to admin: {}, failed: {}",
        summary.stale,
        summary.archived,
        summary.deleted,
        summary.notified,
        summary.redirected,
        summary.failed
    ));
}

//! Repository identity parsed from an SSH clone URL.

use std::sync::LazyLock;

use regex::Regex;

static SSH_URL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^ssh://git@(?<host>.+)/(?<project>.+)/(?<repo>.+)\.git$").ok()
});

/// Host, project and repository of a remote.
///
/// Parsing never fails: a URL of any other shape yields empty fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryIdentity {
    pub host: String,
    pub project: String,
    pub repo: String,
}

impl RepositoryIdentity {
    /// Parse `ssh://git@<host>/<project>/<repo>.git`.
    #[must_use]
    pub fn parse(url: &str) -> Self {
        SSH_URL
            .as_ref()
            .and_then(|re| re.captures(url.trim()))
            .map_or_else(Self::default, |caps| Self {
                host: caps["host"].to_string(),
                project: caps["project"].to_string(),
                repo: caps["repo"].to_string(),
            })
    }

    /// Whether the URL was recognized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.host.is_empty() && self.project.is_empty() && self.repo.is_empty()
    }

    /// Web page listing the repository's branches.
    #[must_use]
    pub fn branches_url(&self) -> String {
        format!(
            "https://{}/projects/{}/repos/{}/branches",
            self.host, self.project, self.repo
        )
    }
}

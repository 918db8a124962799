use std::time::Duration;

use serde::Deserialize;

use crate::version::ReleaseVersion;

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub(crate) const DEFAULT_USER_AGENT: &str = concat!("updatecheck/", env!("CARGO_PKG_VERSION"));
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the UpdateChecker.
#[derive(Debug, Clone)]
pub struct UpdateCheckerConfig {
    /// The GitHub user or organization owning the project.
    pub owner: String,
    /// The repository name.
    pub name: String,
    /// Version of the binary currently running.
    pub running_version: ReleaseVersion,
    /// Optional GitHub API token for authentication.
    pub token: Option<String>,
    /// Per-request timeout for the release source. Default is 30 seconds.
    pub timeout: Duration,
    /// User-Agent header sent to GitHub.
    pub user_agent: String,
    /// Base URL for GitHub API (for testing). Defaults to "https://api.github.com".
    pub(crate) base_url: String,
}

impl UpdateCheckerConfig {
    /// Creates a new config for the given project and running version.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        running_version: impl Into<ReleaseVersion>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            running_version: running_version.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Sets a custom base URL (for testing).
    #[doc(hidden)]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the GitHub API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The page listing the project's releases.
    pub fn release_page_address(&self) -> String {
        format!("https://github.com/{}/{}/releases", self.owner, self.name)
    }
}

/// The result of one completed update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Whether a strictly newer release exists. False when the check failed.
    pub update_available: bool,
    /// The greatest version among the running one and the parsed releases.
    /// `None` when the releases could not be fetched.
    pub latest_version: Option<ReleaseVersion>,
    /// The page listing the project's releases.
    pub release_page_address: String,
}

/// Internal structure for GitHub API response.
#[derive(Debug, Deserialize)]
pub(crate) struct GitHubReleaseResponse {
    pub tag_name: String,
    #[serde(default)]
    pub draft: bool,
}

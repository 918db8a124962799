use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Result, UpdateCheckError};
use crate::source::{GitHubReleaseSource, ReleaseSource};
use crate::types::{CheckOutcome, UpdateCheckerConfig};
use crate::version::ReleaseVersion;

type StatusHandler = Arc<dyn Fn(&CheckOutcome) + Send + Sync>;

/// Checks whether a project has published a release newer than the running binary.
///
/// Each call to [`check_for_update`](Self::check_for_update) is independent.
/// Overlapping checks on one instance are not serialized: each one stores its
/// outcome and notifies, and the last to finish is what
/// [`is_update_available`](Self::is_update_available) reports.
pub struct UpdateChecker<S = GitHubReleaseSource> {
    config: UpdateCheckerConfig,
    release_page_address: String,
    source: S,
    outcome: Mutex<Option<CheckOutcome>>,
    handler: Mutex<Option<StatusHandler>>,
}

impl UpdateChecker<GitHubReleaseSource> {
    /// Creates a new UpdateChecker that queries GitHub.
    pub fn new(config: UpdateCheckerConfig) -> Result<Self> {
        let source = GitHubReleaseSource::new(
            config.base_url.clone(),
            config.token.clone(),
            config.timeout,
            &config.user_agent,
        )?;

        Self::with_source(config, source)
    }
}

impl<S: ReleaseSource> UpdateChecker<S> {
    /// Creates a new UpdateChecker reading releases from `source`.
    pub fn with_source(config: UpdateCheckerConfig, source: S) -> Result<Self> {
        validate_config(&config)?;

        Ok(Self {
            release_page_address: config.release_page_address(),
            config,
            source,
            outcome: Mutex::new(None),
            handler: Mutex::new(None),
        })
    }

    /// The project owner.
    pub fn owner(&self) -> &str {
        &self.config.owner
    }

    /// The project name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Version of the running binary, captured at construction.
    pub fn running_version(&self) -> ReleaseVersion {
        self.config.running_version
    }

    /// Address of the project's releases page on GitHub.
    pub fn release_page_address(&self) -> &str {
        &self.release_page_address
    }

    /// Whether an update is available.
    ///
    /// `None` until the first check completes.
    pub fn is_update_available(&self) -> Option<bool> {
        self.last_outcome().map(|o| o.update_available)
    }

    /// The outcome of the most recently completed check.
    pub fn last_outcome(&self) -> Option<CheckOutcome> {
        self.outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registers the handler called once at the end of every check.
    ///
    /// Replaces any previously registered handler.
    pub fn on_status_changed<F>(&self, handler: F)
    where
        F: Fn(&CheckOutcome) + Send + Sync + 'static,
    {
        *self.handler.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
    }

    /// Runs one update check.
    ///
    /// Never fails: if the releases cannot be fetched, the outcome reports no
    /// update. Release tags that are not versions are skipped. The stored
    /// outcome is replaced and the status handler is called exactly once
    /// before this resolves.
    pub async fn check_for_update(&self) -> CheckOutcome {
        let running = self.config.running_version;
        debug!(
            owner = %self.config.owner,
            name = %self.config.name,
            %running,
            "Checking for update"
        );

        let outcome = match self
            .source
            .list_release_tags(&self.config.owner, &self.config.name)
            .await
        {
            Ok(tags) => {
                let latest = latest_version(running, &tags);
                debug!(%latest, candidates = tags.len(), "Reduced release tags");
                CheckOutcome {
                    update_available: latest != running,
                    latest_version: Some(latest),
                    release_page_address: self.release_page_address.clone(),
                }
            }
            Err(error) => {
                warn!(%error, "Update check failed, assuming no update");
                CheckOutcome {
                    update_available: false,
                    latest_version: None,
                    release_page_address: self.release_page_address.clone(),
                }
            }
        };

        *self.outcome.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome.clone());
        self.notify(&outcome);

        outcome
    }

    /// Runs [`check_for_update`](Self::check_for_update) on the tokio runtime
    /// without waiting for it.
    pub fn spawn_check(self: Arc<Self>) -> JoinHandle<CheckOutcome>
    where
        S: 'static,
    {
        tokio::spawn(async move { self.check_for_update().await })
    }

    fn notify(&self, outcome: &CheckOutcome) {
        let handler = self
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if let Some(handler) = handler {
            handler(outcome);
        }
    }
}

/// Greatest version among `running` and every tag that parses.
fn latest_version(running: ReleaseVersion, tags: &[String]) -> ReleaseVersion {
    tags.iter()
        .filter_map(|tag| match ReleaseVersion::from_release_tag(tag) {
            Ok(version) => Some(version),
            Err(error) => {
                trace!(tag = %tag, %error, "Skipping release tag");
                None
            }
        })
        .fold(running, std::cmp::max)
}

/// Maximum length for a GitHub username/organization name.
/// This limit is enforced by GitHub.
const MAX_GITHUB_OWNER_LENGTH: usize = 39;

/// Maximum length for a GitHub repository name.
/// This limit is enforced by GitHub.
const MAX_GITHUB_REPO_LENGTH: usize = 100;

fn validate_config(config: &UpdateCheckerConfig) -> Result<()> {
    if !is_valid_owner(&config.owner) {
        return Err(UpdateCheckError::InvalidOwner(config.owner.clone()));
    }

    if !is_valid_repo_name(&config.name) {
        return Err(UpdateCheckError::InvalidRepoName(config.name.clone()));
    }

    if Url::parse(&config.base_url).is_err() {
        return Err(UpdateCheckError::InvalidBaseUrl(config.base_url.clone()));
    }

    Ok(())
}

/// Owner: alphanumeric or hyphens, cannot start/end with hyphen, max 39 chars.
fn is_valid_owner(owner: &str) -> bool {
    !owner.is_empty()
        && owner.len() <= MAX_GITHUB_OWNER_LENGTH
        && !owner.starts_with('-')
        && !owner.ends_with('-')
        && owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Repo: alphanumeric, hyphens, underscores, or dots, max 100 chars.
fn is_valid_repo_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_GITHUB_REPO_LENGTH
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

//! Release sources: where the candidate release tags come from.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{Result, UpdateCheckError};
use crate::types::GitHubReleaseResponse;

/// GitHub API version requested on every call.
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Largest page size the releases endpoint accepts.
const PAGE_SIZE: usize = 100;

/// Upper bound on pages fetched for one listing.
const MAX_PAGES: u32 = 10;

/// Lists the published release tags of a project.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Returns the tag of every published release, in no particular order.
    async fn list_release_tags(&self, owner: &str, name: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl<S: ReleaseSource + ?Sized> ReleaseSource for std::sync::Arc<S> {
    async fn list_release_tags(&self, owner: &str, name: &str) -> Result<Vec<String>> {
        (**self).list_release_tags(owner, name).await
    }
}

/// Release source backed by the GitHub REST releases endpoint.
pub struct GitHubReleaseSource {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubReleaseSource {
    /// Creates a source talking to `base_url` with its own transport settings.
    ///
    /// TLS and timeouts are configured on this source's client only.
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Fetches one page of releases.
    async fn fetch_page(
        &self,
        owner: &str,
        name: &str,
        page: u32,
    ) -> Result<Vec<GitHubReleaseResponse>> {
        let url = format!("{}/repos/{}/{}/releases", self.base_url, owner, name);

        let mut request = self
            .client
            .get(&url)
            .query(&[("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())])
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);

        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!("GitHub API returned status {}: {}", status, url);
            let message = response.text().await.unwrap_or_default();
            return Err(UpdateCheckError::ApiError { status, message });
        }

        let body = response.text().await?;
        let releases: Vec<GitHubReleaseResponse> = serde_json::from_str(&body)?;

        Ok(releases)
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleaseSource {
    async fn list_release_tags(&self, owner: &str, name: &str) -> Result<Vec<String>> {
        let mut tags = Vec::new();

        for page in 1..=MAX_PAGES {
            let releases = self.fetch_page(owner, name, page).await?;
            let count = releases.len();

            tags.extend(
                releases
                    .into_iter()
                    .filter(|r| !r.draft)
                    .map(|r| r.tag_name),
            );

            if count < PAGE_SIZE {
                break;
            }
        }

        debug!(owner, name, count = tags.len(), "Listed release tags");
        Ok(tags)
    }
}

use crate::cache::{CacheKey, CacheLookup, ResponseCache};
use crate::config::{AppConfig, RepoId};
use crate::error::Result;
use crate::github::{Endpoint, GitHubClient, RawSource};
use crate::records::{self, CommitRecord, IssueRecord, PullRequestRecord};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Fetches validated records for a single repository.
///
/// Raw pages go through the response cache; schema validation happens after the
/// cache so a cached response is checked exactly like a fresh one.
pub struct RecordFetcher<S = GitHubClient> {
    source: S,
    cache: ResponseCache,
    token: String,
    read_cache: bool,
    max_pages: Option<u32>,
}

impl RecordFetcher {
    /// `read_cache = false` skips cache lookups but still refreshes the entries.
    pub fn new(
        config: &AppConfig,
        token: &str,
        cache: ResponseCache,
        read_cache: bool,
    ) -> Result<Self> {
        let client = GitHubClient::new(token)?;
        Ok(Self::with_source(
            client,
            token,
            cache,
            read_cache,
            config.max_github_api_pages,
        ))
    }
}

impl<S: RawSource> RecordFetcher<S> {
    pub fn with_source(
        source: S,
        token: &str,
        cache: ResponseCache,
        read_cache: bool,
        max_pages: Option<u32>,
    ) -> Self {
        Self {
            source,
            cache,
            token: token.trim().to_string(),
            read_cache,
            max_pages,
        }
    }

    pub async fn fetch_issues(&self, repo: &RepoId) -> Result<Vec<IssueRecord>> {
        let raw = self.fetch_raw(repo, &Endpoint::Issues).await?;
        records::issues_from_json(repo, raw)
    }

    pub async fn fetch_pull_requests(&self, repo: &RepoId) -> Result<Vec<PullRequestRecord>> {
        let raw = self.fetch_raw(repo, &Endpoint::PullRequests).await?;
        records::pull_requests_from_json(repo, raw)
    }

    pub async fn fetch_commits(
        &self,
        repo: &RepoId,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitRecord>> {
        let raw = self.fetch_raw(repo, &Endpoint::Commits { since }).await?;
        records::commits_from_json(repo, raw)
    }

    async fn fetch_raw(&self, repo: &RepoId, endpoint: &Endpoint) -> Result<Vec<Value>> {
        let key = CacheKey::new(endpoint, repo, &self.token, self.max_pages);
        let name = endpoint.name();

        if self.read_cache {
            match self.cache.lookup::<Vec<Value>>(&key).await {
                CacheLookup::Hit(values) => {
                    tracing::debug!(
                        repo = %repo,
                        endpoint = name,
                        count = values.len(),
                        "Cache hit"
                    );
                    return Ok(values);
                }
                CacheLookup::Miss => {
                    tracing::debug!(repo = %repo, endpoint = name, "Cache miss");
                }
                CacheLookup::Unreadable(reason) => {
                    tracing::warn!(
                        repo = %repo,
                        endpoint = name,
                        "Ignoring unreadable cache entry: {}",
                        reason
                    );
                }
            }
        }

        tracing::info!(repo = %repo, endpoint = name, "Fetching from GitHub");
        let values = self.source.fetch_all(repo, endpoint, self.max_pages).await?;

        if let Err(e) = self.cache.store(&key, &values).await {
            tracing::warn!(repo = %repo, "Failed to write cache entry: {:#}", e);
        }

        Ok(values)
    }
}

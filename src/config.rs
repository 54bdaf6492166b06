//! Application configuration and environment variable parsing.
//!
//! Settings are loaded from the environment (optionally seeded from a `.env` file).
//! `AppConfig` governs where raw API responses are cached, how long they stay fresh,
//! and how many repositories are fetched at once. Command-line flags override it.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration as StdDuration;

const CACHE_DIR_NAME: &str = "github-reports";

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// The owner of the repository (e.g., "facebook").
    pub owner: String,
    /// The name of the repository (e.g., "react").
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').map(str::trim).collect();
        match parts.as_slice() {
            [owner, repo]
                if !owner.is_empty()
                    && !repo.is_empty()
                    && !owner.contains("..")
                    && !repo.contains("..") =>
            {
                Ok(Self::new(*owner, *repo))
            }
            _ => bail!("invalid repository '{}': expected the form owner/repo", s.trim()),
        }
    }
}

/// Parses a comma-separated list of "owner/repo" pairs, keeping the given order.
///
/// Example: "facebook/react, rust-lang/rust"
pub fn parse_repo_list(s: &str) -> Result<Vec<RepoId>> {
    let repos = s
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(RepoId::from_str)
        .collect::<Result<Vec<_>>>()?;

    if repos.is_empty() {
        bail!("no repositories given");
    }

    Ok(repos)
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// GitHub Personal Access Token used for every API request.
    pub github_token: Option<String>,

    /// Directory holding cached API responses.
    /// Defaults to the platform cache directory.
    pub cache_dir: Option<PathBuf>,

    /// Age in seconds after which a cached response is refetched.
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// Maximum number of repositories fetched concurrently.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    /// Hard limit on the number of paginated requests per repository and endpoint.
    /// Unlimited when unset.
    pub max_github_api_pages: Option<u32>,
}

fn default_cache_ttl_seconds() -> u64 {
    3600
}

fn default_fetch_concurrency() -> usize {
    4
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            cache_dir: None,
            cache_ttl_seconds: default_cache_ttl_seconds(),
            fetch_concurrency: default_fetch_concurrency(),
            max_github_api_pages: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn cache_ttl(&self) -> StdDuration {
        StdDuration::from_secs(self.cache_ttl_seconds)
    }

    /// Resolves the cache directory, falling back to `.cache/github-reports`
    /// when the platform has no cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join(CACHE_DIR_NAME)
        })
    }
}

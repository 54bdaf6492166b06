//! On-disk cache of raw GitHub API responses.
//!
//! Entries are keyed by everything that shapes a response, including the token, so
//! different credentials never share cached data. Reads never fail: anything that
//! cannot be loaded is reported as `Unreadable` and treated like a miss.

use crate::config::RepoId;
use crate::github::Endpoint;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::Duration as StdDuration;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub endpoint: &'static str,
    pub repo: RepoId,
    pub token: String,
    pub filters: String,
}

impl CacheKey {
    /// A page limit is part of the key: a truncated listing must never be served
    /// to a run that expects the complete one.
    pub fn new(endpoint: &Endpoint, repo: &RepoId, token: &str, max_pages: Option<u32>) -> Self {
        let mut filters = endpoint.filters();
        if let Some(max_pages) = max_pages {
            filters.push(("max_pages", max_pages.to_string()));
        }
        let filters = filters
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        Self {
            endpoint: endpoint.name(),
            repo: repo.clone(),
            token: token.to_string(),
            filters,
        }
    }

    /// Hex SHA-256 of the key, used as the file name so tokens never hit the disk in clear.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}::{}::{}::{}",
            self.endpoint, self.repo, self.token, self.filters
        ));
        format!("{:x}", hasher.finalize())
    }
}

/// Outcome of a cache read.
#[derive(Debug, PartialEq)]
pub enum CacheLookup<T> {
    /// Present and younger than the cache's max age.
    Hit(T),
    /// Absent, or older than the max age.
    Miss,
    /// Present but could not be read or parsed.
    Unreadable(String),
}

#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    stored_at: DateTime<Utc>,
    value: T,
}

#[derive(Clone, Debug)]
pub struct ResponseCache {
    dir: PathBuf,
    max_age: Duration,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, max_age: StdDuration) -> Self {
        Self {
            dir: dir.into(),
            max_age: Duration::from_std(max_age).unwrap_or(Duration::MAX),
        }
    }

    fn path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.digest()))
    }

    pub async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> CacheLookup<T> {
        self.lookup_at(key, Utc::now()).await
    }

    pub async fn lookup_at<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
        now: DateTime<Utc>,
    ) -> CacheLookup<T> {
        let path = self.path(key);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CacheLookup::Miss,
            Err(e) => return CacheLookup::Unreadable(format!("{}: {e}", path.display())),
        };

        let entry: CacheEntry<T> = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => return CacheLookup::Unreadable(format!("{}: {e}", path.display())),
        };

        if now - entry.stored_at > self.max_age {
            return CacheLookup::Miss;
        }

        CacheLookup::Hit(entry.value)
    }

    /// Writes `value` under `key`, replacing any previous entry in full.
    pub async fn store<T: Serialize>(&self, key: &CacheKey, value: &T) -> Result<()> {
        let entry = CacheEntry {
            stored_at: Utc::now(),
            value,
        };
        let bytes = serde_json::to_vec(&entry).context("failed to serialize cache entry")?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create cache directory {}", self.dir.display()))?;

        let path = self.path(key);
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;

        Ok(())
    }
}

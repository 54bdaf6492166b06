//! Service layer producing report charts.
//!
//! `ReportService` is the entry point for every chart. For each report it:
//! 1. Fetches records for every requested repository (through the response cache).
//! 2. Concatenates them in repository order.
//! 3. Aggregates them into a series.
//! 4. Renders the series to a PNG, only once aggregation has succeeded.

use crate::cache::ResponseCache;
use crate::combine::combine_repos;
use crate::config::{AppConfig, RepoId};
use crate::error::ReportError;
use crate::fetcher::RecordFetcher;
use crate::metrics::{self, BurndownMode};
use crate::records::{CommitRecord, IssueRecord, PullRequestRecord};
use crate::render::{self, BreakdownChart, ResolutionChart};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::path::{Path, PathBuf};

const DAYS_PER_MONTH: i64 = 30;

/// Per-invocation overrides for `AppConfig`.
#[derive(Clone, Debug, Default)]
pub struct FetchOptions {
    pub token: Option<String>,
    pub cache_dir: Option<PathBuf>,
    /// Skip cache reads; fresh responses are still written back.
    pub no_cache: bool,
}

pub struct ReportService {
    fetcher: RecordFetcher,
    concurrency: usize,
}

impl ReportService {
    pub fn new(config: &AppConfig, options: FetchOptions) -> Result<Self> {
        let token = options
            .token
            .or_else(|| config.github_token.clone())
            .unwrap_or_default();
        let cache_dir = options.cache_dir.unwrap_or_else(|| config.cache_dir());
        tracing::debug!(cache_dir = %cache_dir.display(), "Using response cache");

        let cache = ResponseCache::new(cache_dir, config.cache_ttl());
        let fetcher = RecordFetcher::new(config, &token, cache, !options.no_cache)?;

        Ok(Self {
            fetcher,
            concurrency: config.fetch_concurrency,
        })
    }

    pub async fn burndown(
        &self,
        repos: &[RepoId],
        mode: BurndownMode,
        output: &Path,
    ) -> Result<()> {
        let issues = self.issues(repos).await?;

        tracing::info!(issues = issues.len(), ?mode, "Processing burndown data");
        let burndown = metrics::burndown(&issues, mode);

        tracing::info!(output = %output.display(), "Plotting burndown chart");
        render::render_burndown(&burndown, output).with_context(|| chart_error(output))
    }

    pub async fn commit_summary(&self, repos: &[RepoId], months: u32, output: &Path) -> Result<()> {
        let since = commits_since(Utc::now(), months);
        let commits = self.commits(repos, since).await?;

        tracing::info!(commits = commits.len(), %since, "Processing weekly commit summary data");
        let summary = metrics::weekly_commit_summary(&commits);

        tracing::info!(output = %output.display(), "Plotting weekly commit summary chart");
        render::render_commit_summary(&summary, output).with_context(|| chart_error(output))
    }

    pub async fn pull_request_activity(&self, repos: &[RepoId], output: &Path) -> Result<()> {
        let prs = self.pull_requests(repos).await?;

        tracing::info!(pull_requests = prs.len(), "Processing PR activity timeline data");
        let activity = metrics::pull_request_activity(&prs);

        tracing::info!(output = %output.display(), "Plotting PR activity timeline chart");
        render::render_pull_activity(&activity, output).with_context(|| chart_error(output))
    }

    pub async fn resolution_time(
        &self,
        repos: &[RepoId],
        chart: ResolutionChart,
        output: &Path,
    ) -> Result<()> {
        let issues = self.issues(repos).await?;

        tracing::info!(issues = issues.len(), "Processing issue resolution time data");
        let times = metrics::resolution_times(&issues);

        tracing::info!(
            output = %output.display(),
            closed = times.len(),
            "Plotting issue resolution time chart"
        );
        render::render_resolution_times(&times, chart, output).with_context(|| chart_error(output))
    }

    pub async fn label_breakdown(
        &self,
        repos: &[RepoId],
        chart: BreakdownChart,
        output: &Path,
    ) -> Result<()> {
        let issues = self.issues(repos).await?;

        tracing::info!(issues = issues.len(), "Processing issue type breakdown data");
        let counts = metrics::label_breakdown(&issues);

        tracing::info!(
            output = %output.display(),
            labels = counts.len(),
            "Plotting issue type breakdown chart"
        );
        render::render_label_breakdown(&counts, chart, output).with_context(|| chart_error(output))
    }

    async fn issues(&self, repos: &[RepoId]) -> Result<Vec<IssueRecord>, ReportError> {
        let fetcher = &self.fetcher;
        combine_repos(repos, self.concurrency, move |repo| async move {
            fetcher.fetch_issues(&repo).await
        })
        .await
    }

    async fn pull_requests(&self, repos: &[RepoId]) -> Result<Vec<PullRequestRecord>, ReportError> {
        let fetcher = &self.fetcher;
        combine_repos(repos, self.concurrency, move |repo| async move {
            fetcher.fetch_pull_requests(&repo).await
        })
        .await
    }

    async fn commits(
        &self,
        repos: &[RepoId],
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitRecord>, ReportError> {
        let fetcher = &self.fetcher;
        combine_repos(repos, self.concurrency, move |repo| async move {
            fetcher.fetch_commits(&repo, since).await
        })
        .await
    }
}

/// Start of the commit window: `months` × 30 days back, truncated to midnight UTC
/// so repeated runs on the same day share a cache entry.
fn commits_since(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    let since = now - Duration::days(i64::from(months) * DAYS_PER_MONTH);
    since.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn chart_error(output: &Path) -> String {
    format!("failed to write chart to {}", output.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_commits_since_truncates_to_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 4, 15, 17, 42, 9).unwrap();
        assert_eq!(
            commits_since(now, 3),
            Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap()
        );
        assert_eq!(
            commits_since(now, 0),
            Utc.with_ymd_and_hms(2024, 4, 15, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_fetching() {
        let config = AppConfig::default();
        let result = ReportService::new(&config, FetchOptions::default());

        let err = result.err().expect("service should not build without a token");
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::Auth { .. })
        ));
    }
}

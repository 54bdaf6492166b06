use crate::config::RepoId;
use crate::error::{ReportError, Result};
use crate::records::TIMESTAMP_FORMAT;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde_json::Value;
use std::future::Future;

const PER_PAGE: u32 = 100;

/// A paginated REST listing of a repository, with its filters.
#[derive(Clone, Debug, PartialEq)]
pub enum Endpoint {
    Issues,
    PullRequests,
    Commits { since: DateTime<Utc> },
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Issues => "issues",
            Self::PullRequests => "pulls",
            Self::Commits { .. } => "commits",
        }
    }

    pub fn route(&self, repo: &RepoId) -> String {
        format!("/repos/{}/{}/{}", repo.owner, repo.repo, self.name())
    }

    /// Query filters, excluding pagination.
    pub fn filters(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Issues | Self::PullRequests => vec![("state", "all".to_string())],
            Self::Commits { since } => {
                vec![("since", since.format(TIMESTAMP_FORMAT).to_string())]
            }
        }
    }

    fn query(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut query = self.filters();
        query.push(("per_page", PER_PAGE.to_string()));
        query.push(("page", page.to_string()));
        query
    }
}

/// Source of raw listing entries for a repository.
pub trait RawSource {
    fn fetch_all(
        &self,
        repo: &RepoId,
        endpoint: &Endpoint,
        max_pages: Option<u32>,
    ) -> impl Future<Output = Result<Vec<Value>>>;
}

pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    /// Builds an authenticated client. A blank token is rejected up front so no
    /// anonymous request is ever made.
    pub fn new(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ReportError::Auth {
                reason: "GitHub token is missing".to_string(),
            });
        }

        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(ReportError::ClientSetup)?;

        Ok(Self { octocrab })
    }
}

impl RawSource for GitHubClient {
    /// Fetches every page of `endpoint` for `repo` as raw JSON entries, in API order.
    async fn fetch_all(
        &self,
        repo: &RepoId,
        endpoint: &Endpoint,
        max_pages: Option<u32>,
    ) -> Result<Vec<Value>> {
        let route = endpoint.route(repo);
        let route = route.as_str();

        collect_pages(repo, max_pages, move |page| {
            let query = endpoint.query(page);
            async move {
                self.octocrab
                    .get::<Vec<Value>, _, _>(route, Some(&query))
                    .await
                    .map_err(|e| classify_error(repo, e))
            }
        })
        .await
    }
}

/// Requests pages starting at 1 until an empty page comes back or `max_pages` is hit.
pub(crate) async fn collect_pages<T, F, Fut>(
    repo: &RepoId,
    max_pages: Option<u32>,
    mut fetch_page: F,
) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut records = Vec::new();
    let mut page = 1;

    loop {
        if let Some(max_pages) = max_pages.filter(|max_pages| page > *max_pages) {
            tracing::warn!(
                "Hit max_github_api_pages ({}) for repo {} before reaching the last page. \
                 Data may be incomplete.",
                max_pages,
                repo
            );
            break;
        }

        let batch = fetch_page(page).await?;
        if batch.is_empty() {
            break;
        }

        tracing::debug!(repo = %repo, page, count = batch.len(), "Fetched page");
        records.extend(batch);
        page += 1;
    }

    Ok(records)
}

fn classify_error(repo: &RepoId, err: octocrab::Error) -> ReportError {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            classify_status(repo, source.status_code.as_u16(), &source.message)
        }
        other => ReportError::Transport {
            repo: repo.to_string(),
            status: None,
            message: other.to_string(),
        },
    }
}

/// Maps a failed GitHub response onto the error the user should see.
pub(crate) fn classify_status(repo: &RepoId, status: u16, message: &str) -> ReportError {
    let repo = repo.to_string();
    match status {
        401 => ReportError::Auth {
            reason: format!("GitHub rejected the token ({message})"),
        },
        404 => ReportError::NotFound { repo },
        429 => ReportError::RateLimited { repo },
        403 if message.to_lowercase().contains("rate limit") => ReportError::RateLimited { repo },
        403 => ReportError::Forbidden {
            repo,
            message: message.to_string(),
        },
        _ => ReportError::Transport {
            repo,
            status: Some(status),
            message: message.to_string(),
        },
    }
}

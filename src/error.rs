//! Error types raised while fetching and validating GitHub records.
//!
//! Everything here is fatal for the current command. Records that merely lack
//! optional fields are not errors; they are filtered by the aggregators.

use std::fmt;
use thiserror::Error;

/// The kind of record a malformed entry was being parsed as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Issue,
    PullRequest,
    Commit,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Issue => "issue",
            Self::PullRequest => "pull request",
            Self::Commit => "commit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    /// Credential missing, blank, or rejected by GitHub.
    #[error("Unauthorized: {reason}. Check your token and its scopes and try again.")]
    Auth { reason: String },

    /// Bad repository identifier, or a token without access to it.
    #[error(
        "Repository {repo} not found or access denied. Check that the name is correct and that \
         your token has access to private repositories (scope: 'repo')."
    )]
    NotFound { repo: String },

    #[error("GitHub API rate limit exceeded while reading {repo}. Wait for the limit to reset and try again.")]
    RateLimited { repo: String },

    #[error("Forbidden: no permission to read {repo} ({message}). Check your token permissions.")]
    Forbidden { repo: String, message: String },

    /// Any other HTTP or network failure.
    #[error("GitHub API error for {repo}: {}{message}", status_prefix(.status))]
    Transport {
        repo: String,
        status: Option<u16>,
        message: String,
    },

    /// A fetched record is missing a required field or has an unparseable one.
    #[error("Malformed {kind} record #{index} from {repo}: {reason}")]
    MalformedRecord {
        kind: RecordKind,
        repo: String,
        index: usize,
        reason: String,
    },

    #[error("failed to build the GitHub client: {0}")]
    ClientSetup(#[source] octocrab::Error),
}

fn status_prefix(status: &Option<u16>) -> String {
    status.map(|code| format!("{code} ")).unwrap_or_default()
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;

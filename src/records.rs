//! GitHub record schemas.
//!
//! Raw API entries are deserialized into permissive structs first, then validated
//! into the strongly typed records the aggregators consume. Validation happens once,
//! at the fetch boundary, so aggregation itself cannot fail.

use crate::config::RepoId;
use crate::error::{RecordKind, ReportError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Timestamp format used by every GitHub REST timestamp field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parses a `YYYY-MM-DDTHH:MM:SSZ` timestamp as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IssueRecord {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub labels: Vec<Label>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PullRequestRecord {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// A commit. Author name and date are optional: commits without them are
/// valid but ignored by the commit summary.
#[derive(Clone, Debug, PartialEq)]
pub struct CommitRecord {
    pub sha: String,
    pub author_name: Option<String>,
    pub authored_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct RawLabel {
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawIssue {
    id: Option<u64>,
    created_at: Option<String>,
    closed_at: Option<String>,
    labels: Option<Vec<RawLabel>>,
}

#[derive(Deserialize)]
struct RawPullRequest {
    id: Option<u64>,
    created_at: Option<String>,
    closed_at: Option<String>,
    merged_at: Option<String>,
}

#[derive(Deserialize)]
struct RawCommit {
    sha: Option<String>,
    commit: Option<RawCommitDetail>,
}

#[derive(Deserialize)]
struct RawCommitDetail {
    author: Option<RawGitAuthor>,
}

#[derive(Deserialize)]
struct RawGitAuthor {
    name: Option<String>,
    date: Option<String>,
}

/// Tracks which raw entry is being validated so errors can point at it.
struct RecordContext<'a> {
    kind: RecordKind,
    repo: &'a RepoId,
    index: usize,
}

impl RecordContext<'_> {
    fn malformed(&self, reason: impl Into<String>) -> ReportError {
        ReportError::MalformedRecord {
            kind: self.kind,
            repo: self.repo.to_string(),
            index: self.index,
            reason: reason.into(),
        }
    }

    fn decode<T: DeserializeOwned>(&self, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| self.malformed(e.to_string()))
    }

    fn required<T>(&self, field: &str, value: Option<T>) -> Result<T> {
        value.ok_or_else(|| self.malformed(format!("missing field `{field}`")))
    }

    fn timestamp(&self, field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
        value
            .map(|s| {
                parse_timestamp(s)
                    .map_err(|e| self.malformed(format!("invalid `{field}` timestamp '{s}': {e}")))
            })
            .transpose()
    }
}

/// Validates raw issue entries. Entries that are pull requests (the issues
/// endpoint returns both) are skipped.
pub fn issues_from_json(repo: &RepoId, values: Vec<Value>) -> Result<Vec<IssueRecord>> {
    values
        .into_iter()
        .enumerate()
        .filter(|(_, value)| value.get("pull_request").is_none())
        .map(|(index, value)| {
            let ctx = RecordContext {
                kind: RecordKind::Issue,
                repo,
                index,
            };
            let raw: RawIssue = ctx.decode(value)?;

            let id = ctx.required("id", raw.id)?;
            let created_at = ctx.timestamp("created_at", raw.created_at.as_deref())?;
            let created_at = ctx.required("created_at", created_at)?;
            let closed_at = ctx.timestamp("closed_at", raw.closed_at.as_deref())?;

            if closed_at.is_some_and(|closed_at| closed_at < created_at) {
                return Err(ctx.malformed("`closed_at` is earlier than `created_at`"));
            }

            let labels = raw
                .labels
                .unwrap_or_default()
                .into_iter()
                .map(|label| ctx.required("labels[].name", label.name).map(|name| Label { name }))
                .collect::<Result<Vec<_>>>()?;

            Ok(IssueRecord {
                id,
                created_at,
                closed_at,
                labels,
            })
        })
        .collect()
}

pub fn pull_requests_from_json(
    repo: &RepoId,
    values: Vec<Value>,
) -> Result<Vec<PullRequestRecord>> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let ctx = RecordContext {
                kind: RecordKind::PullRequest,
                repo,
                index,
            };
            let raw: RawPullRequest = ctx.decode(value)?;

            let id = ctx.required("id", raw.id)?;
            let created_at = ctx.timestamp("created_at", raw.created_at.as_deref())?;

            Ok(PullRequestRecord {
                id,
                created_at: ctx.required("created_at", created_at)?,
                closed_at: ctx.timestamp("closed_at", raw.closed_at.as_deref())?,
                merged_at: ctx.timestamp("merged_at", raw.merged_at.as_deref())?,
            })
        })
        .collect()
}

/// Validates raw commit entries. A missing author block, name, or date is
/// allowed; an unparseable date is not.
pub fn commits_from_json(repo: &RepoId, values: Vec<Value>) -> Result<Vec<CommitRecord>> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let ctx = RecordContext {
                kind: RecordKind::Commit,
                repo,
                index,
            };
            let raw: RawCommit = ctx.decode(value)?;
            let sha = ctx.required("sha", raw.sha)?;

            let author = raw.commit.and_then(|commit| commit.author);
            let (author_name, date) = match author {
                Some(author) => (author.name.filter(|name| !name.is_empty()), author.date),
                None => (None, None),
            };

            Ok(CommitRecord {
                sha,
                author_name,
                authored_at: ctx.timestamp("commit.author.date", date.as_deref())?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn repo() -> RepoId {
        RepoId::new("owner", "repo")
    }

    #[test]
    fn test_parse_timestamp_exact_format() {
        assert_eq!(
            parse_timestamp("2024-01-05T10:30:00Z").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 5, 10, 30, 0).unwrap()
        );
        assert!(parse_timestamp("2024-01-05").is_err());
        assert!(parse_timestamp("2024-01-05T10:30:00+02:00").is_err());
    }

    #[test]
    fn test_issues_skip_pull_requests_and_keep_labels() {
        let values = vec![
            json!({
                "id": 1,
                "created_at": "2024-01-01T00:00:00Z",
                "closed_at": "2024-01-03T12:00:00Z",
                "labels": [{"name": "bug"}, {"name": "Bug"}]
            }),
            json!({
                "id": 2,
                "created_at": "2024-01-02T00:00:00Z",
                "closed_at": null,
                "pull_request": {"url": "https://api.github.com/repos/owner/repo/pulls/2"}
            }),
            json!({"id": 3, "created_at": "2024-01-04T00:00:00Z", "closed_at": null, "labels": []}),
        ];

        let issues = issues_from_json(&repo(), values).unwrap();

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].id, 1);
        assert_eq!(issues[0].labels.len(), 2);
        assert_eq!(issues[0].labels[1].name, "Bug");
        assert_eq!(issues[1].id, 3);
        assert!(issues[1].closed_at.is_none());
    }

    #[test]
    fn test_issue_missing_created_at_is_malformed() {
        let values = vec![
            json!({"id": 1, "created_at": "2024-01-01T00:00:00Z"}),
            json!({"id": 2, "closed_at": "2024-01-03T00:00:00Z"}),
        ];

        match issues_from_json(&repo(), values) {
            Err(ReportError::MalformedRecord {
                kind, index, reason, ..
            }) => {
                assert_eq!(kind, RecordKind::Issue);
                assert_eq!(index, 1);
                assert!(reason.contains("created_at"));
            }
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn test_issue_closed_before_created_is_malformed() {
        let values = vec![json!({
            "id": 1,
            "created_at": "2024-01-05T00:00:00Z",
            "closed_at": "2024-01-01T00:00:00Z"
        })];
        assert!(matches!(
            issues_from_json(&repo(), values),
            Err(ReportError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_pull_request_with_bad_merged_at_is_malformed() {
        let values = vec![json!({
            "id": 9,
            "created_at": "2024-01-05T00:00:00Z",
            "merged_at": "yesterday"
        })];

        let err = pull_requests_from_json(&repo(), values).unwrap_err();
        assert!(err.to_string().contains("merged_at"));
    }

    #[test]
    fn test_pull_requests_keep_optional_events() {
        let values = vec![json!({
            "id": 9,
            "created_at": "2024-01-05T00:00:00Z",
            "closed_at": "2024-01-07T00:00:00Z",
            "merged_at": "2024-01-07T00:00:00Z"
        })];

        let prs = pull_requests_from_json(&repo(), values).unwrap();
        assert_eq!(prs.len(), 1);
        assert!(prs[0].closed_at.is_some());
        assert_eq!(prs[0].merged_at, prs[0].closed_at);
    }

    #[test]
    fn test_commits_without_author_are_kept_without_identity() {
        let values = vec![
            json!({
                "sha": "a1",
                "commit": {"author": {"name": "alice", "date": "2024-01-01T09:00:00Z"}}
            }),
            json!({"sha": "b2", "commit": {"author": null}}),
            json!({
                "sha": "c3",
                "commit": {"author": {"name": "", "date": "2024-01-02T09:00:00Z"}}
            }),
        ];

        let commits = commits_from_json(&repo(), values).unwrap();

        assert_eq!(commits.len(), 3);
        assert_eq!(commits[0].author_name.as_deref(), Some("alice"));
        assert!(commits[1].author_name.is_none());
        assert!(commits[1].authored_at.is_none());
        assert!(commits[2].author_name.is_none());
        assert!(commits[2].authored_at.is_some());
    }

    #[test]
    fn test_commit_with_wrong_field_type_is_malformed() {
        let values = vec![json!({"sha": 42})];
        assert!(matches!(
            commits_from_json(&repo(), values),
            Err(ReportError::MalformedRecord {
                kind: RecordKind::Commit,
                index: 0,
                ..
            })
        ));
    }
}

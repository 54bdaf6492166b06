//! Combining records from several repositories.
//!
//! The result is a plain concatenation in repository-list order. Nothing is
//! deduplicated: record ids are only unique within a repository, and the
//! aggregators key off timestamps and labels, never ids.

use crate::config::RepoId;
use crate::error::Result;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;

/// Fetches every repository with up to `concurrency` requests in flight and
/// concatenates the results.
///
/// Output order is deterministic regardless of which fetch finishes first: all
/// of the first repository's records in their original order, then the
/// second's, and so on. The first error aborts the whole combination.
pub async fn combine_repos<T, F, Fut>(
    repos: &[RepoId],
    concurrency: usize,
    fetch: F,
) -> Result<Vec<T>>
where
    F: FnMut(RepoId) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let per_repo: Vec<Vec<T>> = stream::iter(repos.iter().cloned())
        .map(fetch)
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    Ok(per_repo.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;

    fn repos() -> Vec<RepoId> {
        vec![RepoId::new("org", "a"), RepoId::new("org", "b")]
    }

    #[tokio::test]
    async fn test_concatenates_in_repo_order() {
        let combined = combine_repos(&repos(), 4, |repo| async move {
            let records = match repo.repo.as_str() {
                "a" => {
                    // Finish after "b" to prove completion order does not matter.
                    for _ in 0..10 {
                        tokio::task::yield_now().await;
                    }
                    vec!["a1", "a2", "a3"]
                }
                _ => vec!["b1", "b2"],
            };
            Ok::<_, ReportError>(records)
        })
        .await
        .unwrap();

        assert_eq!(combined, vec!["a1", "a2", "a3", "b1", "b2"]);
    }

    #[tokio::test]
    async fn test_duplicate_records_are_kept() {
        let combined = combine_repos(&repos(), 1, |_repo| async move {
            Ok::<_, ReportError>(vec![1, 2])
        })
        .await
        .unwrap();

        assert_eq!(combined, vec![1, 2, 1, 2]);
    }

    #[tokio::test]
    async fn test_empty_repo_list() {
        let combined: Vec<u32> = combine_repos(&[], 4, |_repo| async move {
            Ok::<_, ReportError>(vec![1])
        })
        .await
        .unwrap();
        assert!(combined.is_empty());
    }

    #[tokio::test]
    async fn test_first_error_aborts() {
        let result: Result<Vec<u32>> = combine_repos(&repos(), 2, |repo| async move {
            if repo.repo == "b" {
                Err(ReportError::NotFound {
                    repo: repo.to_string(),
                })
            } else {
                Ok(vec![1])
            }
        })
        .await;

        assert!(matches!(result, Err(ReportError::NotFound { repo }) if repo == "org/b"));
    }
}

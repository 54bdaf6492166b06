use crate::records::CommitRecord;
use chrono::{Datelike, Days, NaiveTime};
use std::collections::BTreeMap;

const DAYS_PER_WEEK: i64 = 7;

/// Weekly commit counts per author.
///
/// Every author maps to a sequence as long as `week_labels`, with zeros for weeks
/// the author did not commit in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommitSummary {
    /// Monday of each week, `YYYY-MM-DD`.
    pub week_labels: Vec<String>,
    pub per_author: BTreeMap<String, Vec<usize>>,
}

impl CommitSummary {
    pub fn is_empty(&self) -> bool {
        self.week_labels.is_empty()
    }
}

/// Counts commits per author in Monday-aligned weeks.
///
/// Weeks start at midnight UTC on the Monday of the earliest commit and continue
/// until a week would start after the latest commit. Commits without an author
/// name or date are skipped.
pub fn weekly_commit_summary(commits: &[CommitRecord]) -> CommitSummary {
    let retained: Vec<_> = commits
        .iter()
        .filter_map(|commit| Some((commit.author_name.as_deref()?, commit.authored_at?)))
        .collect();

    let (Some(earliest), Some(latest)) = (
        retained.iter().map(|(_, at)| *at).min(),
        retained.iter().map(|(_, at)| *at).max(),
    ) else {
        return CommitSummary::default();
    };

    let days_since_monday = u64::from(earliest.weekday().num_days_from_monday());
    let first_monday = earliest.date_naive() - Days::new(days_since_monday);
    let first_bin_start = first_monday.and_time(NaiveTime::MIN).and_utc();
    let bin_count = ((latest - first_bin_start).num_days() / DAYS_PER_WEEK) as usize + 1;

    let week_labels = (0..bin_count)
        .map(|week| {
            let monday = first_monday + Days::new(week as u64 * DAYS_PER_WEEK as u64);
            monday.format("%Y-%m-%d").to_string()
        })
        .collect();

    let mut per_author: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (author, at) in retained {
        let week = ((at - first_bin_start).num_days() / DAYS_PER_WEEK) as usize;
        per_author
            .entry(author.to_string())
            .or_insert_with(|| vec![0; bin_count])[week] += 1;
    }

    CommitSummary {
        week_labels,
        per_author,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::parse_timestamp;

    fn commit(author: Option<&str>, at: Option<&str>) -> CommitRecord {
        CommitRecord {
            sha: "0000000".to_string(),
            author_name: author.map(str::to_string),
            authored_at: at.map(|at| parse_timestamp(at).unwrap()),
        }
    }

    #[test]
    fn test_empty_input() {
        let summary = weekly_commit_summary(&[]);
        assert!(summary.is_empty());
        assert!(summary.per_author.is_empty());
    }

    #[test]
    fn test_all_commits_dropped() {
        let commits = vec![
            commit(None, Some("2024-01-01T10:00:00Z")),
            commit(Some("alice"), None),
        ];
        assert_eq!(weekly_commit_summary(&commits), CommitSummary::default());
    }

    #[test]
    fn test_monday_and_next_wednesday() {
        let commits = vec![
            commit(Some("alice"), Some("2024-01-01T10:00:00Z")),
            commit(Some("alice"), Some("2024-01-10T10:00:00Z")),
        ];

        let summary = weekly_commit_summary(&commits);

        assert_eq!(summary.week_labels, vec!["2024-01-01", "2024-01-08"]);
        assert_eq!(summary.per_author["alice"], vec![1, 1]);
    }

    #[test]
    fn test_week_bins_start_at_monday_midnight_not_first_commit_time() {
        // Under seven days apart, but on either side of Monday 00:00.
        let commits = vec![
            commit(Some("alice"), Some("2024-01-03T10:00:00Z")),
            commit(Some("alice"), Some("2024-01-08T09:00:00Z")),
        ];

        let summary = weekly_commit_summary(&commits);

        assert_eq!(summary.week_labels, vec!["2024-01-01", "2024-01-08"]);
        assert_eq!(summary.per_author["alice"], vec![1, 1]);
    }

    #[test]
    fn test_weeks_align_to_monday_and_fill_missing_authors() {
        let commits = vec![
            // Thursday; its week starts Monday 2024-02-05.
            commit(Some("bob"), Some("2024-02-08T23:59:59Z")),
            commit(Some("alice"), Some("2024-02-11T00:00:00Z")),
            // Monday midnight opens a new week.
            commit(Some("alice"), Some("2024-02-12T00:00:00Z")),
            commit(None, Some("2024-03-30T00:00:00Z")),
            commit(Some("bob"), Some("2024-02-26T08:00:00Z")),
        ];

        let summary = weekly_commit_summary(&commits);

        assert_eq!(
            summary.week_labels,
            vec!["2024-02-05", "2024-02-12", "2024-02-19", "2024-02-26"]
        );
        assert_eq!(summary.per_author["alice"], vec![1, 1, 0, 0]);
        assert_eq!(summary.per_author["bob"], vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_every_author_sequence_is_full_length_and_sums_to_commit_count() {
        let commits = vec![
            commit(Some("alice"), Some("2023-12-29T12:00:00Z")),
            commit(Some("carol"), Some("2024-01-02T12:00:00Z")),
            commit(Some("alice"), Some("2024-01-15T12:00:00Z")),
            commit(Some("alice"), Some("2024-01-16T12:00:00Z")),
        ];

        let summary = weekly_commit_summary(&commits);

        assert_eq!(summary.week_labels.first().map(String::as_str), Some("2023-12-25"));
        for counts in summary.per_author.values() {
            assert_eq!(counts.len(), summary.week_labels.len());
        }
        assert_eq!(summary.per_author["alice"].iter().sum::<usize>(), 3);
        assert_eq!(summary.per_author["carol"].iter().sum::<usize>(), 1);
    }
}

use crate::records::PullRequestRecord;
use chrono::{DateTime, Datelike, Utc};
use std::collections::BTreeMap;

/// Weekly pull request activity. All four sequences have the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PullActivity {
    /// ISO weeks as `YYYY-Www`, ascending.
    pub weeks: Vec<String>,
    pub opened: Vec<usize>,
    pub closed: Vec<usize>,
    pub merged: Vec<usize>,
}

impl PullActivity {
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

/// Sortable ISO week key, e.g. `2024-W09`.
pub fn iso_week_key(at: DateTime<Utc>) -> String {
    let week = at.iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

/// Counts opened, closed and merged events per ISO week.
///
/// The three events are independent: one pull request can contribute to all
/// three counters, in different weeks. Only weeks with at least one event appear.
pub fn pull_request_activity(prs: &[PullRequestRecord]) -> PullActivity {
    let mut counts: BTreeMap<String, [usize; 3]> = BTreeMap::new();

    for pr in prs {
        let events = [Some(pr.created_at), pr.closed_at, pr.merged_at];
        for (slot, at) in events.into_iter().enumerate() {
            if let Some(at) = at {
                counts.entry(iso_week_key(at)).or_default()[slot] += 1;
            }
        }
    }

    let mut activity = PullActivity::default();
    for (week, [opened, closed, merged]) in counts {
        activity.weeks.push(week);
        activity.opened.push(opened);
        activity.closed.push(closed);
        activity.merged.push(merged);
    }
    activity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::parse_timestamp;

    fn pr(created: &str, closed: Option<&str>, merged: Option<&str>) -> PullRequestRecord {
        let ts = |s: &str| parse_timestamp(s).unwrap();
        PullRequestRecord {
            id: 1,
            created_at: ts(created),
            closed_at: closed.map(ts),
            merged_at: merged.map(ts),
        }
    }

    #[test]
    fn test_empty_input() {
        let activity = pull_request_activity(&[]);
        assert!(activity.is_empty());
        assert!(activity.opened.is_empty());
    }

    #[test]
    fn test_iso_week_key_is_zero_padded() {
        assert_eq!(iso_week_key(parse_timestamp("2024-02-28T00:00:00Z").unwrap()), "2024-W09");
        // 2024-12-30 belongs to ISO week 1 of 2025.
        assert_eq!(iso_week_key(parse_timestamp("2024-12-30T00:00:00Z").unwrap()), "2025-W01");
    }

    #[test]
    fn test_events_counted_independently() {
        let prs = vec![
            pr(
                "2024-02-28T10:00:00Z",
                Some("2024-03-05T10:00:00Z"),
                Some("2024-03-05T09:00:00Z"),
            ),
            pr("2024-03-06T10:00:00Z", Some("2024-03-12T10:00:00Z"), None),
            pr("2024-03-13T10:00:00Z", None, None),
        ];

        let activity = pull_request_activity(&prs);

        assert_eq!(activity.weeks, vec!["2024-W09", "2024-W10", "2024-W11"]);
        assert_eq!(activity.opened, vec![1, 1, 1]);
        assert_eq!(activity.closed, vec![0, 1, 1]);
        assert_eq!(activity.merged, vec![0, 1, 0]);
    }

    #[test]
    fn test_weeks_sort_numerically_and_skip_empty_weeks() {
        let prs = vec![
            pr("2024-03-06T00:00:00Z", None, None),
            pr("2024-02-28T00:00:00Z", None, None),
            pr("2024-06-01T00:00:00Z", None, Some("2024-06-02T00:00:00Z")),
        ];

        let activity = pull_request_activity(&prs);

        assert_eq!(activity.weeks, vec!["2024-W09", "2024-W10", "2024-W22"]);
        assert_eq!(activity.opened.iter().sum::<usize>(), 3);
        assert_eq!(activity.closed.iter().sum::<usize>(), 0);
        assert_eq!(activity.merged.iter().sum::<usize>(), 1);
    }
}

use crate::records::IssueRecord;
use std::collections::BTreeMap;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Occurrences of each label name, case preserved.
pub type LabelCounts = BTreeMap<String, usize>;

/// Days from creation to closure for every closed issue, unrounded.
/// Open issues have no resolution time and are skipped.
pub fn resolution_times(issues: &[IssueRecord]) -> Vec<f64> {
    issues
        .iter()
        .filter_map(|issue| {
            let closed_at = issue.closed_at?;
            Some((closed_at - issue.created_at).num_seconds() as f64 / SECONDS_PER_DAY)
        })
        .collect()
}

/// Counts every label on every issue.
pub fn label_breakdown(issues: &[IssueRecord]) -> LabelCounts {
    let mut counts = LabelCounts::new();
    for label in issues.iter().flat_map(|issue| &issue.labels) {
        *counts.entry(label.name.clone()).or_insert(0) += 1;
    }
    counts
}

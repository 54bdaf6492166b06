use crate::records::IssueRecord;
use chrono::NaiveDate;
use std::collections::HashMap;

/// How the two burndown series are counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BurndownMode {
    /// `closed` counts issues closed on each day; `open` is the total minus
    /// everything closed so far.
    #[default]
    Remaining,
    /// `open` counts issues created on or before each day; `closed` counts issues
    /// closed on or before each day.
    Cumulative,
}

/// Daily issue counts over the observed date span.
#[derive(Clone, Debug, PartialEq)]
pub struct Burndown {
    pub mode: BurndownMode,
    /// Number of issues aggregated.
    pub total: usize,
    /// Every calendar day from the first creation to the last event, inclusive.
    pub days: Vec<NaiveDate>,
    pub open: Vec<usize>,
    pub closed: Vec<usize>,
}

impl Burndown {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Straight line from `total` on the first day down to zero on the last.
    /// A single-day span yields just the total.
    pub fn ideal_line(&self) -> Vec<f64> {
        let total = self.total as f64;
        match self.days.len() {
            0 => Vec::new(),
            1 => vec![total],
            n => {
                let last = (n - 1) as f64;
                (0..n).map(|i| total * (1.0 - i as f64 / last)).collect()
            }
        }
    }
}

/// Buckets issues by calendar day (UTC).
pub fn burndown(issues: &[IssueRecord], mode: BurndownMode) -> Burndown {
    let total = issues.len();
    let mut result = Burndown {
        mode,
        total,
        days: Vec::new(),
        open: Vec::new(),
        closed: Vec::new(),
    };

    let Some(start) = issues.iter().map(|issue| issue.created_at).min() else {
        return result;
    };
    let end = issues
        .iter()
        .flat_map(|issue| std::iter::once(issue.created_at).chain(issue.closed_at))
        .max()
        .unwrap_or(start);

    let created_per_day = count_by_day(issues.iter().map(|issue| issue.created_at.date_naive()));
    let closed_per_day = count_by_day(
        issues
            .iter()
            .filter_map(|issue| issue.closed_at.map(|closed_at| closed_at.date_naive())),
    );

    let end = end.date_naive();
    result.days = start
        .date_naive()
        .iter_days()
        .take_while(|day| *day <= end)
        .collect();

    let mut created_so_far = 0;
    let mut closed_so_far = 0;
    for day in &result.days {
        let created_today = created_per_day.get(day).copied().unwrap_or(0);
        let closed_today = closed_per_day.get(day).copied().unwrap_or(0);
        created_so_far += created_today;
        closed_so_far += closed_today;

        match mode {
            BurndownMode::Remaining => {
                result.open.push(total.saturating_sub(closed_so_far));
                result.closed.push(closed_today);
            }
            BurndownMode::Cumulative => {
                result.open.push(created_so_far);
                result.closed.push(closed_so_far);
            }
        }
    }

    result
}

fn count_by_day(days: impl Iterator<Item = NaiveDate>) -> HashMap<NaiveDate, usize> {
    let mut counts = HashMap::new();
    for day in days {
        *counts.entry(day).or_insert(0) += 1;
    }
    counts
}

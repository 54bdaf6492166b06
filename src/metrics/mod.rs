//! Aggregators turning validated records into chartable series.
//!
//! Every aggregator is a pure function over a slice of records. Empty input
//! produces an empty series, never an error.

mod burndown;
mod commits;
mod issues;
mod pulls;

pub use burndown::{burndown, Burndown, BurndownMode};
pub use commits::{weekly_commit_summary, CommitSummary};
pub use issues::{label_breakdown, resolution_times, LabelCounts};
pub use pulls::{iso_week_key, pull_request_activity, PullActivity};

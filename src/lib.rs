//! Project management charts from GitHub history.
//!
//! Issues, pull requests and commits are fetched from one or more repositories,
//! combined, aggregated into burndown, weekly activity, resolution time and label
//! series, and rendered to PNG.

pub mod cache;
pub mod combine;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod metrics;
pub mod records;
pub mod render;
pub mod reports;

pub use config::{AppConfig, RepoId};
pub use error::ReportError;
pub use reports::{FetchOptions, ReportService};

//! PNG charts for each report.
//!
//! Renderers only lay out what the aggregators produced; the data shaping they need
//! (stacking, binning, quartiles, ordering) lives in small pure helpers.

mod breakdown;
mod burndown;
mod commits;
mod pulls;
mod resolution;

pub use breakdown::{render_label_breakdown, sorted_counts, BreakdownChart};
pub use burndown::render_burndown;
pub use commits::{render_commit_summary, stack_bars, StackedBar};
pub use pulls::render_pull_activity;
pub use resolution::{
    box_stats, histogram, render_resolution_times, BoxStats, HistogramBin, ResolutionChart,
};

use plotters::style::{Palette, Palette99, RGBColor};

pub(crate) const CHART_SIZE: (u32, u32) = (1200, 700);
pub(crate) const TITLE_FONT: (&str, u32) = ("sans-serif", 30);
pub(crate) const MAX_X_LABELS: usize = 12;

pub(crate) fn series_color(index: usize) -> RGBColor {
    let (r, g, b) = Palette99::COLORS[index % Palette99::COLORS.len()];
    RGBColor(r, g, b)
}

/// Upper bound for a value axis with some headroom; never zero.
pub(crate) fn axis_max(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Label for a categorical axis drawn over float coordinates: only exact
/// category positions get a label.
pub(crate) fn category_label(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_max_has_headroom() {
        assert_eq!(axis_max(0.0), 1.0);
        assert!((axis_max(10.0) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_label() {
        let labels = vec!["2024-W01".to_string(), "2024-W02".to_string()];
        assert_eq!(category_label(&labels, 0.0), "2024-W01");
        assert_eq!(category_label(&labels, 1.0000000001), "2024-W02");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn test_series_colors_cycle() {
        assert_eq!(series_color(0), series_color(Palette99::COLORS.len()));
        assert_ne!(series_color(0), series_color(1));
    }
}

use super::{axis_max, category_label, series_color, CHART_SIZE, TITLE_FONT};
use crate::metrics::LabelCounts;
use anyhow::Result;
use plotters::element::Pie;
use plotters::prelude::*;
use std::cmp::Reverse;
use std::path::Path;

const TITLE: &str = "Issue Type Breakdown";
const PIE_RADIUS_RATIO: f64 = 0.35;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BreakdownChart {
    #[default]
    Pie,
    Bar,
}

/// Labels by descending count; ties keep alphabetical order.
pub fn sorted_counts(counts: &LabelCounts) -> Vec<(&str, usize)> {
    let mut sorted: Vec<(&str, usize)> = counts
        .iter()
        .map(|(label, count)| (label.as_str(), *count))
        .collect();
    sorted.sort_by_key(|(_, count)| Reverse(*count));
    sorted
}

pub fn render_label_breakdown(
    counts: &LabelCounts,
    chart: BreakdownChart,
    output: &Path,
) -> Result<()> {
    let sorted = sorted_counts(counts);
    match chart {
        BreakdownChart::Pie => render_pie(&sorted, output),
        BreakdownChart::Bar => render_bar(&sorted, output),
    }
}

fn render_pie(counts: &[(&str, usize)], output: &Path) -> Result<()> {
    let root = BitMapBackend::new(output, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(TITLE, TITLE_FONT)?;

    if !counts.is_empty() {
        let (width, height) = root.dim_in_pixel();
        let center = ((width / 2) as i32, (height / 2) as i32);
        let radius = f64::from(width.min(height)) * PIE_RADIUS_RATIO;

        let sizes: Vec<f64> = counts.iter().map(|(_, count)| *count as f64).collect();
        let colors: Vec<RGBColor> = (0..counts.len()).map(series_color).collect();
        let labels: Vec<String> = counts
            .iter()
            .map(|(label, count)| format!("{label} ({count})"))
            .collect();

        let pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        root.draw(&pie)?;
    }

    root.present()?;
    Ok(())
}

fn render_bar(counts: &[(&str, usize)], output: &Path) -> Result<()> {
    let root = BitMapBackend::new(output, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<String> = counts.iter().map(|(label, _)| label.to_string()).collect();
    let y_max = counts.iter().map(|(_, count)| *count).max().unwrap_or(0) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, TITLE_FONT)
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(60)
        .build_cartesian_2d(
            -0.5f64..(labels.len().max(1) as f64 - 0.5),
            0f64..axis_max(y_max),
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Label")
        .y_desc("Issues")
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|x| category_label(&labels, *x))
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(index, (_, count))| {
        let x = index as f64;
        Rectangle::new(
            [(x - 0.4, 0.0), (x + 0.4, *count as f64)],
            series_color(index).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_counts_by_count_then_name() {
        let counts = LabelCounts::from([
            ("enhancement".to_string(), 2),
            ("bug".to_string(), 5),
            ("docs".to_string(), 2),
            ("Bug".to_string(), 1),
        ]);

        assert_eq!(
            sorted_counts(&counts),
            vec![("bug", 5), ("docs", 2), ("enhancement", 2), ("Bug", 1)]
        );
    }

    #[test]
    fn test_sorted_counts_empty() {
        assert!(sorted_counts(&LabelCounts::new()).is_empty());
    }
}

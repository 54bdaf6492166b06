use super::{axis_max, category_label, CHART_SIZE, MAX_X_LABELS, TITLE_FONT};
use crate::metrics::PullActivity;
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

pub fn render_pull_activity(activity: &PullActivity, output: &Path) -> Result<()> {
    let root = BitMapBackend::new(output, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = activity
        .opened
        .iter()
        .chain(&activity.closed)
        .chain(&activity.merged)
        .copied()
        .max()
        .unwrap_or(0) as f64;
    let x_max = activity.weeks.len().saturating_sub(1).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption("PR Activity Timeline", TITLE_FONT)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, 0f64..axis_max(y_max))?;

    chart
        .configure_mesh()
        .x_desc("Week")
        .y_desc("Pull Requests")
        .x_labels(activity.weeks.len().clamp(2, MAX_X_LABELS))
        .x_label_formatter(&|x| category_label(&activity.weeks, *x))
        .draw()?;

    let series = [
        ("Opened", &activity.opened, BLUE),
        ("Closed", &activity.closed, RED),
        ("Merged", &activity.merged, GREEN),
    ];

    for (label, counts, color) in series {
        let points: Vec<(f64, f64)> = counts
            .iter()
            .enumerate()
            .map(|(week, count)| (week as f64, *count as f64))
            .collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), &color))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        chart.draw_series(points.iter().map(|point| Circle::new(*point, 3, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

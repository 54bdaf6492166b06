use super::{axis_max, category_label, CHART_SIZE, MAX_X_LABELS, TITLE_FONT};
use crate::metrics::{Burndown, BurndownMode};
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

pub fn render_burndown(burndown: &Burndown, output: &Path) -> Result<()> {
    let root = BitMapBackend::new(output, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<String> = burndown
        .days
        .iter()
        .map(|day| day.format("%Y-%m-%d").to_string())
        .collect();
    let ideal = match burndown.mode {
        BurndownMode::Remaining => burndown.ideal_line(),
        BurndownMode::Cumulative => Vec::new(),
    };

    let y_max = burndown
        .open
        .iter()
        .chain(&burndown.closed)
        .map(|count| *count as f64)
        .chain(ideal.iter().copied())
        .fold(0.0, f64::max);
    let x_max = labels.len().saturating_sub(1).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption("Burndown Chart", TITLE_FONT)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, 0f64..axis_max(y_max))?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Issue Count")
        .x_labels(labels.len().clamp(2, MAX_X_LABELS))
        .x_label_formatter(&|x| category_label(&labels, *x))
        .draw()?;

    let (open_label, closed_label) = match burndown.mode {
        BurndownMode::Remaining => ("Open Issues", "Closed Issues (per day)"),
        BurndownMode::Cumulative => ("Opened Issues (cumulative)", "Closed Issues (cumulative)"),
    };

    chart
        .draw_series(LineSeries::new(indexed(&burndown.open), &BLUE))?
        .label(open_label)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .draw_series(LineSeries::new(indexed(&burndown.closed), &RED))?
        .label(closed_label)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    if !ideal.is_empty() {
        let ideal_style = BLACK.mix(0.4);
        chart
            .draw_series(LineSeries::new(
                ideal.iter().enumerate().map(|(i, value)| (i as f64, *value)),
                &ideal_style,
            ))?
            .label("Ideal")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &ideal_style));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn indexed(counts: &[usize]) -> impl Iterator<Item = (f64, f64)> + '_ {
    counts
        .iter()
        .enumerate()
        .map(|(i, count)| (i as f64, *count as f64))
}

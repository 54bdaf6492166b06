use super::{axis_max, category_label, series_color, CHART_SIZE, MAX_X_LABELS, TITLE_FONT};
use crate::metrics::CommitSummary;
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

const BAR_HALF_WIDTH: f64 = 0.4;

/// One author's segment of a weekly bar.
#[derive(Clone, Debug, PartialEq)]
pub struct StackedBar {
    pub week: usize,
    pub bottom: f64,
    pub top: f64,
}

/// Stacks each author's weekly counts on top of the authors before them.
/// Weeks without commits from an author get no segment.
pub fn stack_bars(summary: &CommitSummary) -> Vec<(&str, Vec<StackedBar>)> {
    let mut base = vec![0.0; summary.week_labels.len()];
    let mut stacks = Vec::with_capacity(summary.per_author.len());

    for (author, counts) in &summary.per_author {
        let mut bars = Vec::new();
        for (week, count) in counts.iter().enumerate().filter(|(_, count)| **count > 0) {
            let bottom = base[week];
            let top = bottom + *count as f64;
            base[week] = top;
            bars.push(StackedBar { week, bottom, top });
        }
        stacks.push((author.as_str(), bars));
    }

    stacks
}

pub fn render_commit_summary(summary: &CommitSummary, output: &Path) -> Result<()> {
    let root = BitMapBackend::new(output, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let stacks = stack_bars(summary);
    let y_max = stacks
        .iter()
        .flat_map(|(_, bars)| bars.iter().map(|bar| bar.top))
        .fold(0.0, f64::max);
    let weeks = summary.week_labels.len();

    let mut chart = ChartBuilder::on(&root)
        .caption("Weekly Commit Summary per User", TITLE_FONT)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(weeks.max(1) as f64 - 0.5), 0f64..axis_max(y_max))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Week Starting")
        .y_desc("Commits")
        .x_labels(weeks.clamp(1, MAX_X_LABELS))
        .x_label_formatter(&|x| category_label(&summary.week_labels, *x))
        .draw()?;

    for (index, (author, bars)) in stacks.iter().enumerate() {
        let color = series_color(index);
        chart
            .draw_series(bars.iter().map(|bar| {
                let x = bar.week as f64;
                Rectangle::new(
                    [(x - BAR_HALF_WIDTH, bar.bottom), (x + BAR_HALF_WIDTH, bar.top)],
                    color.filled(),
                )
            }))?
            .label(*author)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

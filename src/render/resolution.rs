use super::{axis_max, CHART_SIZE, TITLE_FONT};
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

const HISTOGRAM_BINS: usize = 20;
const WHISKER_IQR_FACTOR: f64 = 1.5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ResolutionChart {
    #[default]
    Hist,
    #[value(name = "box")]
    BoxPlot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Splits `[0, max]` into `bins` equal-width bins. The maximum value falls in
/// the last bin; if every value is zero the bins are one day wide.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let max = values.iter().copied().fold(0.0, f64::max);
    let width = if max > 0.0 { max / bins as f64 } else { 1.0 };

    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: i as f64 * width,
            end: (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for value in values {
        let index = ((value / width).floor() as usize).min(bins - 1);
        histogram[index].count += 1;
    }

    histogram
}

/// Box plot statistics. Whiskers reach the most extreme values within
/// 1.5 × IQR of the quartiles; anything beyond is an outlier.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = percentile(&sorted, 0.25);
    let median = percentile(&sorted, 0.5);
    let q3 = percentile(&sorted, 0.75);
    let reach = WHISKER_IQR_FACTOR * (q3 - q1);
    let (low_fence, high_fence) = (q1 - reach, q3 + reach);

    let (inliers, outliers): (Vec<f64>, Vec<f64>) = sorted
        .iter()
        .partition(|v| **v >= low_fence && **v <= high_fence);
    let lower_whisker = inliers.first().copied().unwrap_or(q1);
    let upper_whisker = inliers.last().copied().unwrap_or(q3);

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

pub fn render_resolution_times(
    values: &[f64],
    chart: ResolutionChart,
    output: &Path,
) -> Result<()> {
    match chart {
        ResolutionChart::Hist => render_histogram(values, output),
        ResolutionChart::BoxPlot => render_box(values, output),
    }
}

fn render_histogram(values: &[f64], output: &Path) -> Result<()> {
    let root = BitMapBackend::new(output, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let bins = histogram(values, HISTOGRAM_BINS);
    let x_max = bins.last().map_or(1.0, |bin| bin.end);
    let y_max = bins.iter().map(|bin| bin.count).max().unwrap_or(0) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption("Issue Resolution Time", TITLE_FONT)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, 0f64..axis_max(y_max))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Days to Close")
        .y_desc("Issues")
        .draw()?;

    chart.draw_series(bins.iter().map(|bin| {
        Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], BLUE.mix(0.7).filled())
    }))?;
    chart.draw_series(bins.iter().map(|bin| {
        Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], &BLACK)
    }))?;

    root.present()?;
    Ok(())
}

fn render_box(values: &[f64], output: &Path) -> Result<()> {
    const CENTER: f64 = 1.0;
    const HALF_WIDTH: f64 = 0.25;

    let root = BitMapBackend::new(output, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let stats = box_stats(values);
    let y_max = values.iter().copied().fold(0.0, f64::max);

    let mut chart = ChartBuilder::on(&root)
        .caption("Issue Resolution Time", TITLE_FONT)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..2f64, 0f64..axis_max(y_max))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_desc("Days to Close")
        .draw()?;

    if let Some(stats) = stats {
        let (left, right) = (CENTER - HALF_WIDTH, CENTER + HALF_WIDTH);
        let cap = HALF_WIDTH / 2.0;

        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, stats.q1), (right, stats.q3)],
            BLUE.mix(0.3).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, stats.q1), (right, stats.q3)],
            &BLUE,
        )))?;

        let lines = [
            vec![(left, stats.median), (right, stats.median)],
            vec![(CENTER, stats.q3), (CENTER, stats.upper_whisker)],
            vec![(CENTER, stats.q1), (CENTER, stats.lower_whisker)],
            vec![(CENTER - cap, stats.upper_whisker), (CENTER + cap, stats.upper_whisker)],
            vec![(CENTER - cap, stats.lower_whisker), (CENTER + cap, stats.lower_whisker)],
        ];
        chart.draw_series(lines.into_iter().map(|line| PathElement::new(line, &BLACK)))?;

        chart.draw_series(
            stats
                .outliers
                .iter()
                .map(|value| Circle::new((CENTER, *value), 3, &RED)),
        )?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_bins_cover_zero_to_max() {
        let bins = histogram(&[0.0, 1.0, 2.5, 10.0], 4);

        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[3].end, 10.0);
        assert_eq!(
            bins.iter().map(|bin| bin.count).collect::<Vec<_>>(),
            vec![2, 1, 0, 1]
        );
    }

    #[test]
    fn test_histogram_all_zero_durations() {
        let bins = histogram(&[0.0, 0.0], 5);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[0].end, 1.0);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[], 20).is_empty());
    }

    #[test]
    fn test_box_stats_interpolates_quartiles() {
        let stats = box_stats(&[4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();

        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 5.0);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_box_stats_flags_outliers() {
        let stats = box_stats(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();

        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.upper_whisker, 4.0);
        assert_eq!(stats.outliers, vec![100.0]);
    }

    #[test]
    fn test_box_stats_single_value_and_empty() {
        let stats = box_stats(&[2.5]).unwrap();
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.lower_whisker, 2.5);
        assert_eq!(stats.upper_whisker, 2.5);

        assert!(box_stats(&[]).is_none());
    }
}

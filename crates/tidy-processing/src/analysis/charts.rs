//! Chart-ready data for the visualization page.
//!
//! Nothing here draws; each function returns the numbers a front end needs
//! to render a histogram, box plot, scatter plot or bar chart.

use crate::analysis::DescriptiveAnalyzer;
use crate::error::Result;
use crate::table::Table;
use crate::types::{BoxPlotSummary, ColumnKind, FrequencyTable, HistogramBin};
use crate::utils::{numeric_values, present_values, quantile_sorted, sorted};

/// Default number of histogram bins.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Default number of bars in a value-count chart.
pub const DEFAULT_TOP_VALUES: usize = 10;

/// Equal-width histogram of a numeric column.
///
/// Bins span min..max of the non-missing values; the last bin includes the
/// maximum. All-equal values produce a single bin, no values produce none.
pub fn histogram(table: &Table, column: &str, bins: usize) -> Result<Vec<HistogramBin>> {
    let series = table.series_of_kind(column, ColumnKind::Numeric)?;
    let values = sorted(&present_values(&numeric_values(series)?));
    Ok(build_histogram(&values, bins))
}

fn build_histogram(sorted_values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (sorted_values.first(), sorted_values.last()) else {
        return Vec::new();
    };

    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: sorted_values.len(),
        }];
    }

    let bin_count = bins.max(1);
    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];

    for value in sorted_values {
        let index = (((value - min) / width) as usize).min(bin_count - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: min + idx as f64 * width,
            end: if idx + 1 == bin_count {
                max
            } else {
                min + (idx as f64 + 1.0) * width
            },
            count,
        })
        .collect()
}

/// Five-number summaries for the given numeric columns.
///
/// Columns without any value are skipped.
pub fn box_plot(table: &Table, columns: &[String]) -> Result<Vec<BoxPlotSummary>> {
    let mut summaries = Vec::with_capacity(columns.len());

    for column in columns {
        let series = table.series_of_kind(column, ColumnKind::Numeric)?;
        let values = sorted(&present_values(&numeric_values(series)?));
        let (Some(&min), Some(&max)) = (values.first(), values.last()) else {
            continue;
        };
        let quantile = |q| quantile_sorted(&values, q).unwrap_or(min);

        summaries.push(BoxPlotSummary {
            column: column.clone(),
            min,
            q1: quantile(0.25),
            median: quantile(0.5),
            q3: quantile(0.75),
            max,
        });
    }

    Ok(summaries)
}

/// Point pairs for a scatter plot, skipping rows where either value is missing.
pub fn scatter_points(table: &Table, x: &str, y: &str) -> Result<Vec<(f64, f64)>> {
    let xs = numeric_values(table.series_of_kind(x, ColumnKind::Numeric)?)?;
    let ys = numeric_values(table.series_of_kind(y, ColumnKind::Numeric)?)?;

    Ok(xs
        .into_iter()
        .zip(ys)
        .filter_map(|(a, b)| Some((a?, b?)))
        .collect())
}

/// The `top_n` most frequent values of a column, for a bar or pie chart.
pub fn value_counts(table: &Table, column: &str, top_n: usize) -> Result<FrequencyTable> {
    Ok(DescriptiveAnalyzer::frequency_table(table, column)?.top(top_n))
}

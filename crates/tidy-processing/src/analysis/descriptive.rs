use crate::analysis::correlation::correlation_matrix;
use crate::error::Result;
use crate::table::Table;
use crate::types::{ColumnKind, ColumnStats, FrequencyEntry, FrequencyTable, GroupMean, Summary};
use crate::utils::{
    mean, numeric_values, percentage, present_values, quantile_sorted, sample_std, sorted,
    text_values,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Default number of groups returned by [`DescriptiveAnalyzer::grouped_mean`].
pub const DEFAULT_TOP_GROUPS: usize = 10;

/// Read-only statistics over a table.
pub struct DescriptiveAnalyzer;

impl DescriptiveAnalyzer {
    /// Compute the full summary shown on the analysis page.
    ///
    /// The correlation matrix is only present with two or more numeric
    /// columns. Tables without rows or columns produce empty sections.
    pub fn summarize(table: &Table) -> Result<Summary> {
        let numeric_columns = table.numeric_columns();
        let categorical_columns = table.text_columns();

        let mut numeric_values_by_column = Vec::with_capacity(numeric_columns.len());
        let mut column_stats = Vec::with_capacity(numeric_columns.len());
        for name in &numeric_columns {
            let values = numeric_values(table.series(name)?)?;
            column_stats.push(stats_from_values(name, &values));
            numeric_values_by_column.push(values);
        }

        let correlation = (numeric_columns.len() >= 2)
            .then(|| correlation_matrix(numeric_columns.clone(), &numeric_values_by_column));

        let frequencies = categorical_columns
            .iter()
            .map(|name| Self::frequency_table(table, name))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Summarized {} numeric and {} categorical columns",
            numeric_columns.len(),
            categorical_columns.len()
        );

        Ok(Summary {
            row_count: table.height(),
            column_count: table.width(),
            numeric_columns,
            categorical_columns,
            column_stats,
            correlation,
            frequencies,
        })
    }

    /// Statistics for one numeric column.
    pub fn column_stats(table: &Table, column: &str) -> Result<ColumnStats> {
        let series = table.series_of_kind(column, ColumnKind::Numeric)?;
        Ok(stats_from_values(column, &numeric_values(series)?))
    }

    /// Value counts of a column, most frequent first.
    ///
    /// Percentages are taken over all rows, so missing values lower every
    /// share. Equal counts are ordered by value.
    pub fn frequency_table(table: &Table, column: &str) -> Result<FrequencyTable> {
        let values = text_values(table.series(column)?)?;
        let total_rows = values.len();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut missing_count = 0;
        for v in &values {
            match v {
                Some(v) => *counts.entry(v.as_str()).or_insert(0) += 1,
                None => missing_count += 1,
            }
        }

        let mut entries: Vec<FrequencyEntry> = counts
            .into_iter()
            .map(|(value, count)| FrequencyEntry {
                value: value.to_string(),
                count,
                percentage: percentage(count, total_rows).unwrap_or(0.0),
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

        Ok(FrequencyTable {
            column: column.to_string(),
            total_rows,
            missing_count,
            entries,
        })
    }

    /// Mean of `value_column` for each value of `category_column`.
    ///
    /// Rows with a missing category are skipped; missing values do not count
    /// towards a group's mean. Groups are sorted by descending mean, groups
    /// without any value last, and truncated to `top_n`.
    pub fn grouped_mean(
        table: &Table,
        category_column: &str,
        value_column: &str,
        top_n: usize,
    ) -> Result<Vec<GroupMean>> {
        let categories = text_values(table.series(category_column)?)?;
        let values = numeric_values(table.series_of_kind(value_column, ColumnKind::Numeric)?)?;

        let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();
        for (category, value) in categories.iter().zip(&values) {
            let Some(category) = category else { continue };
            let bucket = groups.entry(category.as_str()).or_default();
            if let Some(v) = value.filter(|v| v.is_finite()) {
                bucket.push(v);
            }
        }

        let mut result: Vec<GroupMean> = groups
            .into_iter()
            .map(|(group, vals)| GroupMean {
                group: group.to_string(),
                mean: mean(&vals),
                count: vals.len(),
            })
            .collect();

        result.sort_by(|a, b| match (a.mean, b.mean) {
            (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.group.cmp(&b.group)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.group.cmp(&b.group),
        });
        result.truncate(top_n);

        Ok(result)
    }
}

/// Compute [`ColumnStats`] from extracted values.
pub(crate) fn stats_from_values(column: &str, values: &[Option<f64>]) -> ColumnStats {
    let present = present_values(values);
    let ordered = sorted(&present);

    ColumnStats {
        column: column.to_string(),
        count: present.len(),
        missing_count: values.len() - present.len(),
        mean: mean(&present),
        std: sample_std(&present),
        min: ordered.first().copied(),
        q1: quantile_sorted(&ordered, 0.25),
        median: quantile_sorted(&ordered, 0.5),
        q3: quantile_sorted(&ordered, 0.75),
        max: ordered.last().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TidyError;
    use polars::prelude::*;

    fn sales() -> Table {
        Table::from_dataframe(
            df![
                "region" => [Some("north"), Some("south"), Some("north"), None, Some("east")],
                "amount" => [Some(10.0), Some(40.0), Some(20.0), Some(99.0), None],
                "units" => [Some(1i64), Some(4), Some(2), Some(9), Some(3)],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_summarize_sections() {
        let summary = DescriptiveAnalyzer::summarize(&sales()).unwrap();
        assert_eq!(summary.row_count, 5);
        assert_eq!(summary.numeric_columns, vec!["amount", "units"]);
        assert_eq!(summary.categorical_columns, vec!["region"]);
        assert!(summary.correlation.is_some());

        let amount = summary.stats_for("amount").unwrap();
        assert_eq!(amount.count, 4);
        assert_eq!(amount.missing_count, 1);
        assert_eq!(amount.min, Some(10.0));
        assert_eq!(amount.max, Some(99.0));
        assert_eq!(amount.median, Some(30.0));
        assert_eq!(amount.mean, Some(42.25));
    }

    #[test]
    fn test_frequency_percentages_use_total_rows() {
        let freq = DescriptiveAnalyzer::frequency_table(&sales(), "region").unwrap();
        assert_eq!(freq.total_rows, 5);
        assert_eq!(freq.missing_count, 1);
        assert_eq!(freq.entries[0].value, "north");
        assert_eq!(freq.entries[0].count, 2);
        assert_eq!(freq.entries[0].percentage, 40.0);
        // Ties ordered by value
        assert_eq!(freq.entries[1].value, "east");
        assert_eq!(freq.entries[1].percentage, 20.0);
        let total: f64 = freq.entries.iter().map(|e| e.percentage).sum();
        assert!(total < 100.0);
    }

    #[test]
    fn test_frequency_rounding() {
        let table = Table::from_dataframe(df!["c" => ["a", "b", "b"]].unwrap());
        let freq = DescriptiveAnalyzer::frequency_table(&table, "c").unwrap();
        assert_eq!(freq.entries[0].percentage, 66.67);
        assert_eq!(freq.entries[1].percentage, 33.33);
    }

    #[test]
    fn test_all_missing_column_has_undefined_stats() {
        let table = Table::from_dataframe(
            df![
                "v" => [None::<f64>, None, None],
            ]
            .unwrap(),
        );
        let stats = DescriptiveAnalyzer::column_stats(&table, "v").unwrap();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.median, None);
        assert_eq!(stats.std, None);
        assert_eq!(stats.min, None);
        assert_eq!(stats.max, None);
    }

    #[test]
    fn test_single_numeric_column_has_no_correlation() {
        let table = Table::from_dataframe(df!["v" => [1.0, 2.0]].unwrap());
        let summary = DescriptiveAnalyzer::summarize(&table).unwrap();
        assert!(summary.correlation.is_none());
    }

    #[test]
    fn test_summarize_empty_table() {
        let summary = DescriptiveAnalyzer::summarize(&Table::empty()).unwrap();
        assert_eq!(summary.row_count, 0);
        assert!(summary.column_stats.is_empty());
        assert!(summary.frequencies.is_empty());
        assert!(summary.correlation.is_none());

        let zero_rows = Table::from_dataframe(
            df![
                "v" => Vec::<f64>::new(),
                "c" => Vec::<String>::new(),
            ]
            .unwrap(),
        );
        let summary = DescriptiveAnalyzer::summarize(&zero_rows).unwrap();
        assert_eq!(summary.column_stats[0].mean, None);
        assert!(summary.frequencies[0].entries.is_empty());
    }

    #[test]
    fn test_grouped_mean() {
        let groups = DescriptiveAnalyzer::grouped_mean(&sales(), "region", "amount", 10).unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec!["south", "north", "east"]);
        assert_eq!(groups[0].mean, Some(40.0));
        assert_eq!(groups[1].mean, Some(15.0));
        assert_eq!(groups[2].mean, None);

        let top = DescriptiveAnalyzer::grouped_mean(&sales(), "region", "amount", 1).unwrap();
        assert_eq!(top.len(), 1);
    }

    #[test]
    fn test_grouped_mean_errors() {
        let err = DescriptiveAnalyzer::grouped_mean(&sales(), "nope", "amount", 10).unwrap_err();
        assert!(matches!(err, TidyError::ColumnNotFound(_)));

        let err = DescriptiveAnalyzer::grouped_mean(&sales(), "amount", "region", 10).unwrap_err();
        assert!(matches!(err, TidyError::InvalidColumnKind { .. }));
    }
}

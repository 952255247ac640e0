//! Statistical imputation methods.
//!
//! Provides mean, median and mode imputation. Statistics are computed over
//! each column's own non-missing values at the time the step runs.

use crate::config::MissingStrategy;
use crate::error::Result;
use crate::types::{ColumnFill, ColumnKind, FillValue, MissingValueReport};
use crate::utils::{
    fill_numeric_nulls, fill_string_nulls, numeric_mode, numeric_values, present_values,
    string_mode, text_values,
};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::warn;

/// Fill value for columns that have no value to take a mode from.
pub const UNKNOWN_PLACEHOLDER: &str = "Unknown";

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Apply a fill strategy to every eligible column.
    ///
    /// `columns` lists each column with its kind, in table order. Mean and
    /// median only touch numeric columns; mode touches every column with
    /// missing values. `DropRows` and `None` are not fill strategies and
    /// leave the frame unchanged.
    pub fn impute(
        df: &mut DataFrame,
        columns: &[(String, ColumnKind)],
        strategy: MissingStrategy,
        processing_steps: &mut Vec<String>,
    ) -> Result<MissingValueReport> {
        let mut report = MissingValueReport {
            strategy,
            ..Default::default()
        };

        for (col_name, kind) in columns {
            let fill = match strategy {
                MissingStrategy::FillMean if *kind == ColumnKind::Numeric => {
                    Self::apply_numeric_mean(df, col_name, processing_steps)?
                }
                MissingStrategy::FillMedian if *kind == ColumnKind::Numeric => {
                    Self::apply_numeric_median(df, col_name, processing_steps)?
                }
                MissingStrategy::FillMode => {
                    Self::apply_mode_imputation(df, col_name, *kind, processing_steps)?
                }
                _ => None,
            };

            if let Some(fill) = fill {
                report.cells_filled += fill.cells_filled;
                report.columns_filled.push(fill);
            }
        }

        Ok(report)
    }

    /// Apply mean imputation for a numeric column.
    pub fn apply_numeric_mean(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<Option<ColumnFill>> {
        Self::apply_numeric_statistic(df, col_name, processing_steps, "mean", |s| s.mean())
    }

    /// Apply median imputation for a numeric column.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<Option<ColumnFill>> {
        Self::apply_numeric_statistic(df, col_name, processing_steps, "median", |s| s.median())
    }

    fn apply_numeric_statistic(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
        label: &str,
        statistic: fn(&Series) -> Option<f64>,
    ) -> Result<Option<ColumnFill>> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        let Some(fill_value) = statistic(&series).filter(|v| v.is_finite()) else {
            warn!(
                "Column '{}' has no values to compute a {}; left unchanged",
                col_name, label
            );
            return Ok(None);
        };

        let filled = fill_numeric_nulls(&series, fill_value)?;
        df.replace(col_name, filled)?;

        processing_steps.push(format!(
            "Filled '{}' with {}: {:.2}",
            col_name, label, fill_value
        ));

        Ok(Some(ColumnFill {
            column: col_name.to_string(),
            value: FillValue::Number(fill_value),
            cells_filled: missing,
        }))
    }

    /// Apply mode imputation for a column of any kind.
    ///
    /// The column keeps its dtype. A column with no values at all is filled
    /// with [`UNKNOWN_PLACEHOLDER`] and becomes a string column.
    pub fn apply_mode_imputation(
        df: &mut DataFrame,
        col_name: &str,
        kind: ColumnKind,
        processing_steps: &mut Vec<String>,
    ) -> Result<Option<ColumnFill>> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        if missing == series.len() {
            return Self::apply_constant_imputation(df, col_name, processing_steps).map(Some);
        }

        let first_missing = series
            .is_null()
            .into_iter()
            .position(|is_null| is_null.unwrap_or(false))
            .unwrap_or(0);

        let (filled, value) = match kind {
            ColumnKind::Numeric => {
                let values = present_values(&numeric_values(&series)?);
                match numeric_mode(&values) {
                    Some(mode) => {
                        let filled = fill_numeric_nulls(&series, mode)?.cast(series.dtype())?;
                        (filled, FillValue::Number(mode))
                    }
                    None => return Ok(None),
                }
            }
            ColumnKind::Text => {
                let values = text_values(&series)?;
                match string_mode(values.iter().flatten().map(String::as_str)) {
                    Some(mode) => {
                        let filled = fill_string_nulls(&series, &mode)?;
                        (filled, FillValue::Text(mode))
                    }
                    None => return Ok(None),
                }
            }
            ColumnKind::Boolean | ColumnKind::Temporal => {
                let filled = fill_physical_mode(&series)?;
                let shown = text_values(&filled)?
                    .get(first_missing)
                    .cloned()
                    .flatten()
                    .unwrap_or_default();
                (filled, FillValue::Text(shown))
            }
        };

        df.replace(col_name, filled)?;

        processing_steps.push(format!("Filled '{}' with mode: {}", col_name, value));

        Ok(Some(ColumnFill {
            column: col_name.to_string(),
            value,
            cells_filled: missing,
        }))
    }

    /// Fill every missing cell with the constant "Unknown".
    pub fn apply_constant_imputation(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<ColumnFill> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let missing = series.null_count();
        let filled = fill_string_nulls(&series, UNKNOWN_PLACEHOLDER)?;
        df.replace(col_name, filled)?;

        processing_steps.push(format!(
            "Filled '{}' with constant value: '{}'",
            col_name, UNKNOWN_PLACEHOLDER
        ));

        Ok(ColumnFill {
            column: col_name.to_string(),
            value: FillValue::Text(UNKNOWN_PLACEHOLDER.to_string()),
            cells_filled: missing,
        })
    }
}

/// Mode-fill a boolean or temporal Series through its integer representation.
///
/// Ties resolve to the smallest physical value (false before true, earlier
/// before later). The result has the input dtype.
fn fill_physical_mode(series: &Series) -> Result<Series> {
    let physical = series.to_physical_repr().cast(&DataType::Int64)?;
    let values: Vec<Option<i64>> = physical.i64()?.into_iter().collect();

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for v in values.iter().flatten() {
        *counts.entry(*v).or_insert(0) += 1;
    }
    let Some(mode) = counts
        .into_iter()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| vb.cmp(va)))
        .map(|(v, _)| v)
    else {
        return Ok(series.clone());
    };

    let filled: Vec<Option<i64>> = values.into_iter().map(|v| Some(v.unwrap_or(mode))).collect();
    let filled = Series::new(series.name().clone(), filled);
    Ok(filled.cast(series.dtype())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns_of(df: &DataFrame) -> Vec<(String, ColumnKind)> {
        df.get_columns()
            .iter()
            .map(|c| (c.name().to_string(), ColumnKind::from_dtype(c.dtype())))
            .collect()
    }

    #[test]
    fn test_mean_imputation() {
        let mut df = df![
            "a" => [Some(1.0), Some(2.0), None, Some(3.0)],
            "b" => [Some(10.0), Some(20.0), Some(30.0), Some(40.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let fill = StatisticalImputer::apply_numeric_mean(&mut df, "a", &mut steps)
            .unwrap()
            .unwrap();
        assert_eq!(fill.value, FillValue::Number(2.0));
        assert_eq!(fill.cells_filled, 1);

        let col_a = df.column("a").unwrap();
        assert_eq!(col_a.null_count(), 0);
        assert_eq!(col_a.get(2).unwrap().try_extract::<f64>().unwrap(), 2.0);
        assert!(steps[0].contains("mean"));

        // Column without missing values is untouched
        let none = StatisticalImputer::apply_numeric_mean(&mut df, "b", &mut steps).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_median_imputation_converts_to_float() {
        let mut df = df![
            "a" => [Some(1i64), Some(2), None, Some(10)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let fill = StatisticalImputer::apply_numeric_median(&mut df, "a", &mut steps)
            .unwrap()
            .unwrap();
        assert_eq!(fill.value, FillValue::Number(2.0));
        assert_eq!(df.column("a").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_median_interpolates_even_count() {
        let mut df = df![
            "a" => [Some(1i64), Some(2), None, Some(3), Some(10)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let fill = StatisticalImputer::apply_numeric_median(&mut df, "a", &mut steps)
            .unwrap()
            .unwrap();
        assert_eq!(fill.value, FillValue::Number(2.5));
        assert_eq!(
            df.column("a").unwrap().get(2).unwrap().try_extract::<f64>().unwrap(),
            2.5
        );
    }

    #[test]
    fn test_mean_skips_all_missing_column() {
        let mut df = df![
            "a" => [None::<f64>, None],
        ]
        .unwrap();
        let mut steps = Vec::new();
        let fill = StatisticalImputer::apply_numeric_mean(&mut df, "a", &mut steps).unwrap();
        assert!(fill.is_none());
        assert_eq!(df.column("a").unwrap().null_count(), 2);
    }

    #[test]
    fn test_mode_imputation_text() {
        let mut df = df![
            "city" => [Some("Paris"), Some("Rome"), Some("Paris"), None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let fill =
            StatisticalImputer::apply_mode_imputation(&mut df, "city", ColumnKind::Text, &mut steps)
                .unwrap()
                .unwrap();
        assert_eq!(fill.value, FillValue::Text("Paris".to_string()));

        let values: Vec<Option<&str>> = df
            .column("city")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values[3], Some("Paris"));
    }

    #[test]
    fn test_mode_imputation_keeps_integer_dtype() {
        let mut df = df![
            "age" => [Some(30i64), Some(25), Some(30), None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        StatisticalImputer::apply_mode_imputation(&mut df, "age", ColumnKind::Numeric, &mut steps)
            .unwrap();
        let col = df.column("age").unwrap();
        assert_eq!(col.dtype(), &DataType::Int64);
        assert_eq!(col.get(3).unwrap().try_extract::<i64>().unwrap(), 30);
    }

    #[test]
    fn test_mode_imputation_boolean() {
        let mut df = df![
            "active" => [Some(true), Some(true), Some(false), None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let fill = StatisticalImputer::apply_mode_imputation(
            &mut df,
            "active",
            ColumnKind::Boolean,
            &mut steps,
        )
        .unwrap()
        .unwrap();
        assert_eq!(fill.value, FillValue::Text("true".to_string()));
        let col = df.column("active").unwrap();
        assert_eq!(col.dtype(), &DataType::Boolean);
        assert_eq!(col.null_count(), 0);
    }

    #[test]
    fn test_mode_imputation_all_missing_uses_unknown() {
        let mut df = df![
            "notes" => [None::<&str>, None, None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let fill =
            StatisticalImputer::apply_mode_imputation(&mut df, "notes", ColumnKind::Text, &mut steps)
                .unwrap()
                .unwrap();
        assert_eq!(fill.value, FillValue::Text(UNKNOWN_PLACEHOLDER.to_string()));
        assert_eq!(fill.cells_filled, 3);
        assert_eq!(df.column("notes").unwrap().null_count(), 0);
    }

    #[test]
    fn test_impute_mean_only_touches_numeric() {
        let mut df = df![
            "score" => [Some(1.0), None, Some(3.0)],
            "name" => [Some("a"), None, Some("c")],
        ]
        .unwrap();
        let columns = columns_of(&df);
        let mut steps = Vec::new();

        let report =
            StatisticalImputer::impute(&mut df, &columns, MissingStrategy::FillMean, &mut steps)
                .unwrap();
        assert_eq!(report.cells_filled, 1);
        assert_eq!(report.columns_filled.len(), 1);
        assert_eq!(report.columns_filled[0].column, "score");
        assert_eq!(df.column("name").unwrap().null_count(), 1);
    }

    #[test]
    fn test_impute_mode_touches_all_kinds() {
        let mut df = df![
            "score" => [Some(1.0), None, Some(1.0)],
            "name" => [Some("a"), None, Some("a")],
        ]
        .unwrap();
        let columns = columns_of(&df);
        let mut steps = Vec::new();

        let report =
            StatisticalImputer::impute(&mut df, &columns, MissingStrategy::FillMode, &mut steps)
                .unwrap();
        assert_eq!(report.cells_filled, 2);
        assert_eq!(steps.len(), 2);
    }
}

//! Outlier handling module.
//!
//! Rows are removed with a z-score filter applied one numeric column at a
//! time. Each column's mean and standard deviation are recomputed on the rows
//! that survived the previous columns, so the result depends on column order.

use crate::error::Result;
use crate::types::ColumnOutliers;
use crate::utils::{mean, numeric_values, present_values, sample_std};
use polars::prelude::*;
use tracing::debug;

/// Handles outlier detection and removal.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Remove rows whose absolute z-score reaches `threshold`, column by column.
    ///
    /// Missing values are never outliers. A column with zero or undefined
    /// standard deviation removes nothing.
    pub fn remove_zscore_outliers(
        df: &mut DataFrame,
        columns: &[String],
        threshold: f64,
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<ColumnOutliers>> {
        let original_rows = df.height();
        let mut per_column = Vec::new();

        for col_name in columns {
            if df.height() == 0 {
                break;
            }

            let values = numeric_values(df.column(col_name)?.as_materialized_series())?;
            let outliers = zscore_outlier_mask(&values, threshold);
            let removed = outliers.iter().filter(|o| **o).count();
            if removed == 0 {
                continue;
            }

            let mask_values: Vec<bool> = outliers.iter().map(|o| !o).collect();
            let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
            *df = df.filter(&mask)?;

            debug!("Removed {} outlier rows using column '{}'", removed, col_name);
            per_column.push(ColumnOutliers {
                column: col_name.clone(),
                rows_removed: removed,
            });
        }

        let rows_removed = original_rows - df.height();
        if rows_removed > 0 {
            processing_steps.push(format!(
                "Removed {} rows containing outliers (|z| >= {})",
                rows_removed, threshold
            ));
        } else {
            processing_steps.push("No outliers found".to_string());
        }

        Ok(per_column)
    }
}

/// Flag each value whose absolute z-score is at or above `threshold`.
///
/// Mean and sample standard deviation come from the non-missing values.
/// Missing values and non-finite z-scores are not flagged.
pub fn zscore_outlier_mask(values: &[Option<f64>], threshold: f64) -> Vec<bool> {
    let present = present_values(values);
    let (Some(m), Some(std)) = (mean(&present), sample_std(&present)) else {
        return vec![false; values.len()];
    };

    values
        .iter()
        .map(|v| match v {
            Some(x) => {
                let z = (x - m) / std;
                z.is_finite() && z.abs() >= threshold
            }
            None => false,
        })
        .collect()
}

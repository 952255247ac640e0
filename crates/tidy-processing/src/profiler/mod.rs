//! Data profiling module for table inspection.
//!
//! This module provides the "inspect quality" view of a table:
//! - Per-column dtype, kind, missing and distinct counts
//! - Sample values
//! - Duplicate row count

use crate::cleaner::DataCleaner;
use crate::error::Result;
use crate::table::Table;
use crate::types::{ColumnProfile, TableProfile};
use crate::utils::{percentage, text_values};
use std::collections::HashSet;
use tracing::debug;

/// Number of sample values collected per column.
pub const SAMPLE_SIZE: usize = 5;

/// Data profiler for analyzing table structure.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile an entire table.
    pub fn profile_table(table: &Table) -> Result<TableProfile> {
        let df = table.dataframe();
        let mut column_profiles = Vec::with_capacity(df.width());

        for (col, kind) in df.get_columns().iter().zip(table.kinds()) {
            let series = col.as_materialized_series();
            let values = text_values(series)?;

            let missing_count = series.null_count();
            let unique_count = values.iter().flatten().collect::<HashSet<_>>().len();

            column_profiles.push(ColumnProfile {
                name: series.name().to_string(),
                dtype: format!("{}", series.dtype()),
                kind: *kind,
                missing_count,
                missing_percentage: percentage(missing_count, df.height()).unwrap_or(0.0),
                unique_count,
                sample_values: sample_values(&values, SAMPLE_SIZE),
            });
        }

        let duplicate_count = DataCleaner::duplicate_count(df)?;
        let total_missing = column_profiles.iter().map(|c| c.missing_count).sum();
        debug!(
            "Profiled {} columns: {} duplicates, {} missing cells",
            column_profiles.len(),
            duplicate_count,
            total_missing
        );

        Ok(TableProfile {
            shape: df.shape(),
            column_profiles,
            duplicate_count,
            duplicate_percentage: percentage(duplicate_count, df.height()).unwrap_or(0.0),
            total_missing,
        })
    }
}

/// The first `max_samples` non-missing values.
fn sample_values(values: &[Option<String>], max_samples: usize) -> Vec<String> {
    values.iter().flatten().take(max_samples).cloned().collect()
}

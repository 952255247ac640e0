//! Row-level cleaning operations.
//!
//! This module provides functionality for:
//! - Removing exact duplicate rows (first occurrence kept)
//! - Dropping rows that contain any missing value
//! - Standardizing text columns (see [`standardize_text_columns`])

mod sanitizers;

pub use sanitizers::{normalize_text, standardize_text_columns};

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Row cleaner for duplicate and missing-row removal.
pub struct DataCleaner;

impl DataCleaner {
    /// Number of rows that repeat an earlier row.
    ///
    /// Missing cells compare equal to each other.
    pub fn duplicate_count(df: &DataFrame) -> Result<usize> {
        if df.height() == 0 || df.width() == 0 {
            return Ok(0);
        }
        let unique = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        Ok(df.height() - unique.height())
    }

    /// Remove exact duplicate rows, keeping the first occurrence in place.
    ///
    /// Returns the deduplicated frame and the number of rows removed.
    pub fn remove_duplicates(df: &DataFrame) -> Result<(DataFrame, usize)> {
        let before = df.height();
        if before == 0 || df.width() == 0 {
            return Ok((df.clone(), 0));
        }

        let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;

        let removed = before - deduped.height();
        debug!("Removed {} duplicate rows", removed);
        Ok((deduped, removed))
    }

    /// Remove every row that has a missing value in any column.
    ///
    /// Returns the filtered frame and the number of rows removed.
    pub fn drop_rows_with_missing(df: &DataFrame) -> Result<(DataFrame, usize)> {
        let before = df.height();
        if before == 0 || df.width() == 0 {
            return Ok((df.clone(), 0));
        }

        let mut keep = vec![true; before];
        for col in df.get_columns() {
            let nulls = col.as_materialized_series().is_null();
            for (row, is_null) in nulls.into_iter().enumerate() {
                if is_null.unwrap_or(false) {
                    keep[row] = false;
                }
            }
        }

        let mask = BooleanChunked::from_slice("mask".into(), &keep);
        let filtered = df.filter(&mask)?;

        let removed = before - filtered.height();
        debug!("Dropped {} rows with missing values", removed);
        Ok((filtered, removed))
    }
}

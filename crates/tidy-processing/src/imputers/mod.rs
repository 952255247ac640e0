//! Imputation module for handling missing values.
//!
//! This module provides the statistical fill strategies (mean, median, mode)
//! used by the missing-value step of the cleaning pipeline.

mod statistical;

pub use statistical::{StatisticalImputer, UNKNOWN_PLACEHOLDER};

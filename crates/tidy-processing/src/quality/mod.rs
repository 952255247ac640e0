//! Data quality analysis module.
//!
//! This module provides functionality for identifying data quality issues
//! such as missing values, duplicates, inconsistent text and outliers.

mod analyzer;

pub use analyzer::DataQualityAnalyzer;

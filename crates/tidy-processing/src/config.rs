//! Configuration types for loading and cleaning tables.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. All types are plain serde
//! structs so a front end (or the CLI `--config` flag) can supply them as JSON.

use crate::error::TidyError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default z-score threshold for outlier removal.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Default number of rows scanned for CSV schema inference.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 1000;

/// Tokens read as missing values when loading a CSV.
pub const DEFAULT_NULL_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Strategy for handling missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingStrategy {
    /// Leave missing values in place
    #[default]
    None,
    /// Remove any row containing a missing value
    DropRows,
    /// Fill numeric columns with the column mean
    FillMean,
    /// Fill numeric columns with the column median
    FillMedian,
    /// Fill every column with its most frequent value ("Unknown" if none)
    FillMode,
}

impl MissingStrategy {
    /// Returns a human-readable name for the strategy.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::DropRows => "drop rows",
            Self::FillMean => "fill with mean",
            Self::FillMedian => "fill with median",
            Self::FillMode => "fill with mode",
        }
    }
}

/// Configuration for the cleaning pipeline.
///
/// Every switch defaults to off, so `CleaningConfig::default()` returns the
/// input table unchanged.
///
/// # Example
///
/// ```rust,ignore
/// use tidy_processing::config::{CleaningConfig, MissingStrategy};
///
/// let config = CleaningConfig::builder()
///     .remove_duplicates(true)
///     .missing_strategy(MissingStrategy::FillMedian)
///     .remove_outliers(true)
///     .outlier_z_threshold(2.5)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Remove rows that exactly duplicate an earlier row.
    pub remove_duplicates: bool,

    /// How missing values are handled.
    pub missing_strategy: MissingStrategy,

    /// Trim and lowercase every text column.
    pub standardize_text: bool,

    /// Remove rows whose z-score in any numeric column reaches the threshold.
    pub remove_outliers: bool,

    /// Absolute z-score at or above which a value is an outlier.
    /// Default: 3.0
    pub outlier_z_threshold: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            remove_duplicates: false,
            missing_strategy: MissingStrategy::None,
            standardize_text: false,
            remove_outliers: false,
            outlier_z_threshold: DEFAULT_Z_THRESHOLD,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.outlier_z_threshold.is_finite() || self.outlier_z_threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidZThreshold(
                self.outlier_z_threshold,
            ));
        }
        Ok(())
    }

    /// Returns true when at least one cleaning step is enabled.
    pub fn has_any_step(&self) -> bool {
        self.remove_duplicates
            || self.missing_strategy != MissingStrategy::None
            || self.standardize_text
            || self.remove_outliers
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: CleaningConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid outlier z-score threshold: {0} (must be a finite number above 0.0)")]
    InvalidZThreshold(f64),

    #[error("Invalid schema inference length: {0} (must be at least 1)")]
    InvalidInferSchemaLength(usize),
}

impl From<ConfigValidationError> for TidyError {
    fn from(err: ConfigValidationError) -> Self {
        TidyError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    remove_duplicates: Option<bool>,
    missing_strategy: Option<MissingStrategy>,
    standardize_text: Option<bool>,
    remove_outliers: Option<bool>,
    outlier_z_threshold: Option<f64>,
}

impl CleaningConfigBuilder {
    /// Enable or disable duplicate row removal.
    pub fn remove_duplicates(mut self, remove: bool) -> Self {
        self.remove_duplicates = Some(remove);
        self
    }

    /// Set the missing-value strategy.
    pub fn missing_strategy(mut self, strategy: MissingStrategy) -> Self {
        self.missing_strategy = Some(strategy);
        self
    }

    /// Enable or disable text standardization (trim + lowercase).
    pub fn standardize_text(mut self, standardize: bool) -> Self {
        self.standardize_text = Some(standardize);
        self
    }

    /// Enable or disable z-score outlier removal.
    pub fn remove_outliers(mut self, remove: bool) -> Self {
        self.remove_outliers = Some(remove);
        self
    }

    /// Set the z-score threshold used by outlier removal.
    ///
    /// # Arguments
    /// * `threshold` - Finite value above 0.0 (e.g., 3.0)
    pub fn outlier_z_threshold(mut self, threshold: f64) -> Self {
        self.outlier_z_threshold = Some(threshold);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            remove_duplicates: self.remove_duplicates.unwrap_or(false),
            missing_strategy: self.missing_strategy.unwrap_or_default(),
            standardize_text: self.standardize_text.unwrap_or(false),
            remove_outliers: self.remove_outliers.unwrap_or(false),
            outlier_z_threshold: self.outlier_z_threshold.unwrap_or(DEFAULT_Z_THRESHOLD),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Options for reading CSV input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Number of rows scanned to infer column types.
    /// Default: 1000
    pub infer_schema_length: usize,

    /// Tokens treated as missing values.
    pub null_values: Vec<String>,

    /// Parse date-like text columns into temporal columns.
    pub try_parse_dates: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
            try_parse_dates: true,
        }
    }
}

impl LoadOptions {
    /// Validate the options.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.infer_schema_length == 0 {
            return Err(ConfigValidationError::InvalidInferSchemaLength(
                self.infer_schema_length,
            ));
        }
        Ok(())
    }

    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = rows;
        self
    }

    pub fn with_try_parse_dates(mut self, parse: bool) -> Self {
        self.try_parse_dates = parse;
        self
    }
}

//! Cleaning pipeline and builder.
//!
//! The pipeline runs up to four steps in a fixed order: deduplication,
//! missing values, text standardization, outlier removal. It never mutates
//! its input and never adds or removes columns.

use crate::cleaner::{DataCleaner, standardize_text_columns};
use crate::config::{CleaningConfig, MissingStrategy};
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::pipeline::outliers::OutlierHandler;
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::table::Table;
use crate::types::{CleaningReport, ColumnKind, MissingValueReport};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Clean a table with the given configuration.
///
/// Shorthand for building a [`CleaningPipeline`] without a progress reporter.
pub fn clean(table: &Table, config: &CleaningConfig) -> Result<(Table, CleaningReport)> {
    CleaningPipeline::builder()
        .config(config.clone())
        .build()?
        .clean(table)
}

/// The cleaning pipeline.
///
/// Use [`CleaningPipeline::builder()`] to create one.
///
/// # Example
///
/// ```rust,ignore
/// use tidy_processing::{CleaningConfig, CleaningPipeline, MissingStrategy};
///
/// let config = CleaningConfig::builder()
///     .remove_duplicates(true)
///     .missing_strategy(MissingStrategy::FillMean)
///     .build()?;
///
/// let (cleaned, report) = CleaningPipeline::builder()
///     .config(config)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .clean(&table)?;
/// ```
pub struct CleaningPipeline {
    config: CleaningConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Front ends may run the pipeline on a worker thread.
static_assertions::assert_impl_all!(CleaningPipeline: Send);

impl CleaningPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> CleaningPipelineBuilder {
        CleaningPipelineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// Run every enabled step and return the cleaned table with its report.
    pub fn clean(&self, table: &Table) -> Result<(Table, CleaningReport)> {
        let start_time = Instant::now();
        let config = &self.config;

        info!("Starting cleaning pipeline on table {:?}", table.shape());
        let mut report = CleaningReport::new(table.shape());
        let mut df = table.dataframe().clone();

        // Step 1: Deduplication
        if config.remove_duplicates {
            self.report_progress(ProgressUpdate::new(
                CleaningStage::Deduplication,
                0.0,
                "Removing duplicate rows...",
            ));
            info!("Step 1: Removing duplicate rows...");

            let (deduped, removed) =
                DataCleaner::remove_duplicates(&df).context("Removing duplicate rows")?;
            df = deduped;
            report.duplicates_removed = removed;
            report.steps.push(if removed > 0 {
                format!("Removed {} duplicate rows", removed)
            } else {
                "No duplicate rows found".to_string()
            });

            self.report_progress(ProgressUpdate::new(
                CleaningStage::Deduplication,
                1.0,
                format!("Removed {} duplicate rows", removed),
            ));
        } else {
            debug!("Step 1: Skipping deduplication (disabled)");
        }

        // Step 2: Missing values
        match config.missing_strategy {
            MissingStrategy::None => {
                debug!("Step 2: Leaving missing values in place");
            }
            MissingStrategy::DropRows => {
                self.report_progress(ProgressUpdate::new(
                    CleaningStage::MissingValues,
                    0.0,
                    "Dropping rows with missing values...",
                ));
                info!("Step 2: Dropping rows with missing values...");

                let (filtered, dropped) = DataCleaner::drop_rows_with_missing(&df)
                    .context("Dropping rows with missing values")?;
                df = filtered;
                report.missing = MissingValueReport {
                    strategy: MissingStrategy::DropRows,
                    rows_dropped: dropped,
                    ..Default::default()
                };
                report
                    .steps
                    .push(format!("Dropped {} rows with missing values", dropped));

                self.report_progress(ProgressUpdate::new(
                    CleaningStage::MissingValues,
                    1.0,
                    format!("Dropped {} rows", dropped),
                ));
            }
            strategy => {
                self.report_progress(ProgressUpdate::new(
                    CleaningStage::MissingValues,
                    0.0,
                    format!("Filling missing values ({})...", strategy.display_name()),
                ));
                info!("Step 2: Filling missing values ({})...", strategy.display_name());

                let columns = column_kinds(&Table::from_dataframe(df.clone()));
                let missing_report =
                    StatisticalImputer::impute(&mut df, &columns, strategy, &mut report.steps)
                        .context("Filling missing values")?;

                self.report_progress(ProgressUpdate::new(
                    CleaningStage::MissingValues,
                    1.0,
                    format!("Filled {} cells", missing_report.cells_filled),
                ));
                report.missing = missing_report;
            }
        }

        // Kinds are resolved again because fills may change a column's dtype.
        let current = Table::from_dataframe(df);

        // Step 3: Text standardization
        let current = if config.standardize_text {
            self.report_progress(ProgressUpdate::new(
                CleaningStage::TextStandardization,
                0.0,
                "Standardizing text columns...",
            ));
            info!("Step 3: Standardizing text columns...");

            let text_columns = current.text_columns();
            let (standardized, normalized) =
                standardize_text_columns(current.into_dataframe(), &text_columns)
                    .context("Standardizing text columns")?;
            if !normalized.is_empty() {
                report.steps.push(format!(
                    "Trimmed and lowercased {} text columns: {}",
                    normalized.len(),
                    normalized.join(", ")
                ));
            }
            report.text_columns_normalized = normalized;

            self.report_progress(ProgressUpdate::new(
                CleaningStage::TextStandardization,
                1.0,
                "Text standardization complete",
            ));
            Table::from_dataframe(standardized)
        } else {
            debug!("Step 3: Skipping text standardization (disabled)");
            current
        };

        // Step 4: Outlier removal
        let current = if config.remove_outliers {
            self.report_progress(ProgressUpdate::new(
                CleaningStage::OutlierRemoval,
                0.0,
                "Removing outliers...",
            ));
            info!(
                "Step 4: Removing outliers (|z| >= {})...",
                config.outlier_z_threshold
            );

            let numeric_columns = current.numeric_columns();
            let mut df = current.into_dataframe();
            let per_column = OutlierHandler::remove_zscore_outliers(
                &mut df,
                &numeric_columns,
                config.outlier_z_threshold,
                &mut report.steps,
            )
            .context("Removing outliers")?;
            report.outlier_rows_removed = per_column.iter().map(|c| c.rows_removed).sum();
            report.outliers_by_column = per_column;

            self.report_progress(ProgressUpdate::new(
                CleaningStage::OutlierRemoval,
                1.0,
                format!("Removed {} outlier rows", report.outlier_rows_removed),
            ));
            Table::from_dataframe(df)
        } else {
            debug!("Step 4: Skipping outlier removal (disabled)");
            current
        };

        report.shape_after = current.shape();
        report.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Cleaning complete: {:?} -> {:?} in {}ms",
            report.shape_before, report.shape_after, report.duration_ms
        );
        self.report_progress(ProgressUpdate::complete("Cleaning completed successfully"));

        Ok((current, report))
    }
}

fn column_kinds(table: &Table) -> Vec<(String, ColumnKind)> {
    table
        .column_names()
        .into_iter()
        .zip(table.kinds().iter().copied())
        .collect()
}

/// Builder for [`CleaningPipeline`].
#[derive(Default)]
pub struct CleaningPipelineBuilder {
    config: Option<CleaningConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl CleaningPipelineBuilder {
    /// Set the cleaning configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during cleaning.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<CleaningPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(CleaningPipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::sync::Mutex;

    fn table(df: DataFrame) -> Table {
        Table::from_dataframe(df)
    }

    #[test]
    fn test_default_config_returns_input_unchanged() {
        let input = table(
            df![
                "a" => [Some(1.0), None, Some(1.0)],
                "b" => [Some(" X"), Some(" X"), None],
            ]
            .unwrap(),
        );

        let (cleaned, report) = clean(&input, &CleaningConfig::default()).unwrap();
        assert!(cleaned.same_data(&input));
        assert!(!report.has_changes());
        assert!(report.steps.is_empty());
    }

    #[test]
    fn test_dedup_scenario() {
        let input = table(
            df![
                "id" => [1i64, 1, 2],
                "name" => ["A", "A", "B"],
            ]
            .unwrap(),
        );
        let config = CleaningConfig::builder()
            .remove_duplicates(true)
            .build()
            .unwrap();

        let (cleaned, report) = clean(&input, &config).unwrap();
        assert_eq!(cleaned.height(), 2);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.shape_after, (2, 2));
    }

    #[test]
    fn test_standardize_scenario() {
        let input = table(
            df![
                "gender" => ["Male", "male", "MALE", "Female"],
            ]
            .unwrap(),
        );
        let config = CleaningConfig::builder()
            .standardize_text(true)
            .build()
            .unwrap();

        let (cleaned, report) = clean(&input, &config).unwrap();
        let values: Vec<Option<&str>> = cleaned
            .series("gender")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            values,
            vec![Some("male"), Some("male"), Some("male"), Some("female")]
        );
        assert_eq!(report.text_columns_normalized, vec!["gender"]);
    }

    #[test]
    fn test_outlier_scenario() {
        let input = table(
            df![
                "score" => [10.0, 12.0, 11.0, 13.0, 1000.0],
            ]
            .unwrap(),
        );
        let config = CleaningConfig::builder()
            .remove_outliers(true)
            .outlier_z_threshold(1.5)
            .build()
            .unwrap();

        let (cleaned, report) = clean(&input, &config).unwrap();
        let values: Vec<Option<f64>> = cleaned
            .series("score")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(10.0), Some(12.0), Some(11.0), Some(13.0)]);
        assert_eq!(report.outlier_rows_removed, 1);
    }

    #[test]
    fn test_outlier_threshold_two_keeps_five_rows() {
        // With five values no |z| can exceed 4 / sqrt(5) = 1.789, so 2.0 removes nothing.
        let input = table(
            df![
                "score" => [10.0, 12.0, 11.0, 13.0, 1000.0],
            ]
            .unwrap(),
        );
        let config = CleaningConfig::builder()
            .remove_outliers(true)
            .outlier_z_threshold(2.0)
            .build()
            .unwrap();

        let (cleaned, report) = clean(&input, &config).unwrap();
        assert_eq!(cleaned.height(), 5);
        assert_eq!(report.outlier_rows_removed, 0);
        assert!(cleaned.same_data(&input));
    }

    #[test]
    fn test_mean_fill_runs_after_dedup() {
        // The duplicate 100.0 row is removed first, so the mean is (100 + 1) / 2.
        let input = table(
            df![
                "id" => [Some(1i64), Some(1), Some(2), Some(3)],
                "v" => [Some(100.0), Some(100.0), Some(1.0), None],
            ]
            .unwrap(),
        );
        let config = CleaningConfig::builder()
            .remove_duplicates(true)
            .missing_strategy(MissingStrategy::FillMean)
            .build()
            .unwrap();

        let (cleaned, report) = clean(&input, &config).unwrap();
        assert_eq!(cleaned.height(), 3);
        let v = cleaned.series("v").unwrap();
        assert_eq!(v.null_count(), 0);
        assert_eq!(v.get(2).unwrap().try_extract::<f64>().unwrap(), 50.5);
        assert_eq!(report.missing.cells_filled, 1);
    }

    #[test]
    fn test_columns_are_preserved() {
        let input = table(
            df![
                "a" => [Some(1.0), None, Some(3.0), Some(1.0)],
                "b" => [Some("x"), Some("y"), None, Some("x")],
                "c" => [Some(true), None, Some(false), Some(true)],
            ]
            .unwrap(),
        );
        let config = CleaningConfig::builder()
            .remove_duplicates(true)
            .missing_strategy(MissingStrategy::DropRows)
            .standardize_text(true)
            .remove_outliers(true)
            .build()
            .unwrap();

        let (cleaned, _) = clean(&input, &config).unwrap();
        assert_eq!(cleaned.column_names(), input.column_names());
    }

    #[test]
    fn test_empty_result_flows_through_later_steps() {
        let input = table(
            df![
                "a" => [None::<f64>, None],
                "b" => [Some("x"), None],
            ]
            .unwrap(),
        );
        let config = CleaningConfig::builder()
            .missing_strategy(MissingStrategy::DropRows)
            .standardize_text(true)
            .remove_outliers(true)
            .build()
            .unwrap();

        let (cleaned, report) = clean(&input, &config).unwrap();
        assert_eq!(cleaned.height(), 0);
        assert_eq!(report.missing.rows_dropped, 2);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = table(
            df![
                "v" => [Some(1.0), None],
            ]
            .unwrap(),
        );
        let snapshot = input.clone();
        let config = CleaningConfig::builder()
            .missing_strategy(MissingStrategy::FillMedian)
            .build()
            .unwrap();

        clean(&input, &config).unwrap();
        assert!(input.same_data(&snapshot));
    }

    #[test]
    fn test_progress_reports_enabled_stages() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stages);

        let pipeline = CleaningPipeline::builder()
            .config(
                CleaningConfig::builder()
                    .remove_duplicates(true)
                    .build()
                    .unwrap(),
            )
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap();

        pipeline
            .clean(&table(df!["a" => [1i64, 1]].unwrap()))
            .unwrap();

        let stages = stages.lock().unwrap();
        assert_eq!(stages.first(), Some(&CleaningStage::Deduplication));
        assert_eq!(stages.last(), Some(&CleaningStage::Complete));
        assert!(!stages.contains(&CleaningStage::OutlierRemoval));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = CleaningConfig {
            outlier_z_threshold: -1.0,
            ..Default::default()
        };
        let err = CleaningPipeline::builder().config(config).build().err().unwrap();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}

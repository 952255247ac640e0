//! Tabular Data Cleaning and Analysis Library
//!
//! Cleans messy CSV data and computes descriptive statistics, built with Rust
//! and Polars.
//!
//! # Overview
//!
//! This library provides:
//!
//! - **Data Cleaning**: Duplicate removal, missing value handling, text
//!   standardization and z-score outlier removal, in that fixed order
//! - **Descriptive Analysis**: Column statistics, correlation matrix,
//!   frequency tables and grouped means
//! - **Quality Inspection**: Per-column profiles and detected data quality issues
//! - **Chart Data**: Histogram bins, box-plot summaries, scatter points, value counts
//! - **Session State**: An explicit value holding the original and cleaned tables
//! - **Progress Reporting**: Stage-by-stage updates from the cleaning pipeline
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tidy_processing::{CleaningConfig, CleaningPipeline, DescriptiveAnalyzer, LoadOptions, MissingStrategy, Table};
//!
//! // Load data
//! let table = Table::from_csv_path("data.csv", &LoadOptions::default())?;
//!
//! // Clean it
//! let config = CleaningConfig::builder()
//!     .remove_duplicates(true)
//!     .missing_strategy(MissingStrategy::FillMedian)
//!     .standardize_text(true)
//!     .build()?;
//!
//! let (cleaned, report) = CleaningPipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .clean(&table)?;
//!
//! println!("Removed {} duplicate rows", report.duplicates_removed);
//!
//! // Analyze the result
//! let summary = DescriptiveAnalyzer::summarize(&cleaned)?;
//! for stats in &summary.column_stats {
//!     println!("{}: mean {:?}", stats.column, stats.mean);
//! }
//! ```
//!
//! # Sessions
//!
//! Front ends that keep state between interactions hold a [`Session`]:
//!
//! ```rust,ignore
//! use tidy_processing::{CleaningConfig, SampleDataset, Session};
//!
//! let mut session = Session::new();
//! session.load_sample(SampleDataset::default())?;
//!
//! let report = session.apply_cleaning(&CleaningConfig::builder().remove_duplicates(true).build()?)?;
//! let summary = session.summarize()?;
//!
//! let mut out = Vec::new();
//! session.export_csv(&mut out)?;
//! ```

pub mod analysis;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod sample;
pub mod session;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analysis::{DEFAULT_HISTOGRAM_BINS, DEFAULT_TOP_GROUPS, DescriptiveAnalyzer};
pub use cleaner::DataCleaner;
pub use config::{
    CleaningConfig, CleaningConfigBuilder, ConfigValidationError, LoadOptions, MissingStrategy,
};
pub use error::{Result, ResultExt, TidyError};
pub use imputers::StatisticalImputer;
pub use pipeline::{
    CleaningPipeline, CleaningPipelineBuilder, CleaningStage, ClosureProgressReporter,
    ProgressReporter, ProgressUpdate, clean,
};
pub use profiler::DataProfiler;
pub use quality::DataQualityAnalyzer;
pub use reporting::{CleaningRunReport, ReportGenerator};
pub use sample::{SampleDataset, SampleDatasetBuilder};
pub use session::{EXPORT_FILE_NAME, HistoryEntry, Session, SourceInfo};
pub use table::Table;
pub use types::{
    CleaningReport, ColumnKind, ColumnStats, CorrelationMatrix, DataQualityIssue, FrequencyEntry,
    FrequencyTable, GroupMean, IssueKind, Severity, Summary, TableProfile,
};

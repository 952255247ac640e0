//! Progress reporting for the cleaning pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use tidy_processing::CleaningPipeline;
//!
//! let (cleaned, report) = CleaningPipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .clean(&table)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Removing exact duplicate rows
    Deduplication,
    /// Dropping or filling missing values
    MissingValues,
    /// Trimming and lowercasing text columns
    TextStandardization,
    /// Removing z-score outlier rows
    OutlierRemoval,
    /// Pipeline completed successfully
    Complete,
}

impl CleaningStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Deduplication => "Removing Duplicates",
            Self::MissingValues => "Handling Missing Values",
            Self::TextStandardization => "Standardizing Text",
            Self::OutlierRemoval => "Removing Outliers",
            Self::Complete => "Complete",
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Deduplication => 0.0,
            Self::MissingValues => 0.25,
            Self::TextStandardization => 0.50,
            Self::OutlierRemoval => 0.75,
            Self::Complete => 1.0,
        }
    }
}

/// A progress update emitted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates an update for the start or end of a stage.
    ///
    /// `stage_progress` is 0.0 when the stage starts and 1.0 when it ends.
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + 0.25 * stage_progress.clamp(0.0, 1.0);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates during cleaning.
///
/// Implementations must be `Send + Sync` so a pipeline can be moved to a
/// worker thread by a front end.
pub trait ProgressReporter: Send + Sync {
    /// Called at the start and end of each enabled stage.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

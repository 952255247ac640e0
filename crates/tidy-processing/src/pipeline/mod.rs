//! Pipeline module.
//!
//! This module provides the cleaning pipeline and related components.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{CleaningPipeline, CleaningPipelineBuilder, clean};
pub use outliers::{OutlierHandler, zscore_outlier_mask};
pub use progress::{CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};

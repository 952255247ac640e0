//! Descriptive analysis of a table.
//!
//! This module produces the read-only statistics of the analysis page:
//! - Per-column statistics for numeric columns
//! - Pearson correlation matrix
//! - Frequency tables for categorical columns
//! - Grouped means
//! - Chart-ready data (histogram, box plot, scatter, value counts)

pub mod charts;
mod correlation;
mod descriptive;

pub use charts::{
    DEFAULT_HISTOGRAM_BINS, DEFAULT_TOP_VALUES, box_plot, histogram, scatter_points, value_counts,
};
pub use correlation::{correlation_matrix, pearson};
pub use descriptive::{DEFAULT_TOP_GROUPS, DescriptiveAnalyzer};

//! Report generation module.
//!
//! This module writes the results of a cleaning run to disk:
//! - The cleaned table as CSV (`cleaned_data.csv` by default)
//! - A JSON report bundling the configuration, the cleaning report and a
//!   summary of the cleaned table
//!
//! # Example
//!
//! ```rust,ignore
//! use tidy_processing::reporting::{CleaningRunReport, ReportGenerator};
//!
//! let generator = ReportGenerator::new("outputs");
//! let output = generator.save_table(&cleaned, "cleaned_data.csv")?;
//!
//! let report = CleaningRunReport::new("data.csv", Some(&output), &config, &report, summary);
//! generator.write_report_to_file(&report, "cleaned_data")?;
//! ```

mod generator;

pub use generator::{CleaningRunReport, ReportGenerator};

use crate::config::CleaningConfig;
use crate::error::Result;
use crate::table::Table;
use crate::types::{CleaningReport, Summary};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Everything known about one cleaning run, for `--json` output and
/// `--emit-report` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningRunReport {
    /// RFC 3339 timestamp of report creation
    pub generated_at: String,
    pub input_file: String,
    /// Path of the cleaned CSV, if one was written
    pub output_file: Option<String>,
    pub config: CleaningConfig,
    pub cleaning: CleaningReport,
    /// Descriptive summary of the cleaned table
    pub summary: Summary,
}

impl CleaningRunReport {
    pub fn new(
        input_file: impl Into<String>,
        output_file: Option<&Path>,
        config: &CleaningConfig,
        cleaning: &CleaningReport,
        summary: Summary,
    ) -> Self {
        Self {
            generated_at: Local::now().to_rfc3339(),
            input_file: input_file.into(),
            output_file: output_file.map(|p| p.display().to_string()),
            config: config.clone(),
            cleaning: cleaning.clone(),
            summary,
        }
    }
}

// ============================================================================
// Report Generator
// ============================================================================

/// Writes tables and reports into one output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write a table as CSV, creating the output directory if needed.
    pub fn save_table(&self, table: &Table, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join(file_name);
        table.write_csv_path(&path)?;

        info!("Cleaned data saved: {}", path.display());
        Ok(path)
    }

    /// Write a serializable report to `<base_name>_report.json`.
    pub fn write_report_to_file<T: Serialize>(
        &self,
        report: &T,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}

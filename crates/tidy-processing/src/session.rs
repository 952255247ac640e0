//! Working session state.
//!
//! A [`Session`] holds everything a front end needs between interactions:
//! the loaded table, the most recent cleaned table and its report, and a
//! short history of cleaning runs. It is an ordinary value owned by the
//! caller; nothing here is global.
//!
//! # Lifecycle
//!
//! ```text
//! load_* ──► original ──► apply_cleaning(config) ──► cleaned + last_report
//!                ▲                 │                        │
//!                └── always reads ─┘                        ▼
//!                                                 history (max 10, newest first)
//! ```
//!
//! Loading a new table clears the cleaned table, the report and the history.
//! A failed load leaves the session exactly as it was.

use crate::analysis::DescriptiveAnalyzer;
use crate::config::{CleaningConfig, LoadOptions};
use crate::error::{Result, TidyError};
use crate::pipeline::clean;
use crate::profiler::DataProfiler;
use crate::quality::DataQualityAnalyzer;
use crate::sample::SampleDataset;
use crate::table::Table;
use crate::types::{CleaningReport, ColumnKind, DataQualityIssue, Summary, TableProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// File name used when exporting the working table.
pub const EXPORT_FILE_NAME: &str = "cleaned_data.csv";

/// Maximum number of cleaning history entries to keep.
pub const MAX_HISTORY_ENTRIES: usize = 10;

// ============================================================================
// SOURCE METADATA
// ============================================================================

/// Information about a single column of the loaded table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub null_count: usize,
}

/// Metadata about the loaded table and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Display name, usually the file name.
    pub name: String,
    /// Full path when loaded from disk.
    pub path: Option<String>,
    /// Size of the raw CSV input in bytes, when known.
    pub size_bytes: Option<u64>,
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnInfo>,
}

impl SourceInfo {
    fn describe(
        name: impl Into<String>,
        path: Option<String>,
        size_bytes: Option<u64>,
        table: &Table,
    ) -> Self {
        let columns = table
            .dataframe()
            .get_columns()
            .iter()
            .zip(table.kinds())
            .map(|(col, kind)| ColumnInfo {
                name: col.name().to_string(),
                dtype: format!("{}", col.dtype()),
                kind: *kind,
                null_count: col.null_count(),
            })
            .collect();

        Self {
            name: name.into(),
            path,
            size_bytes,
            row_count: table.height(),
            column_count: table.width(),
            columns,
        }
    }
}

/// A loaded table bundled with its source metadata.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub source: SourceInfo,
}

// ============================================================================
// CLEANING HISTORY
// ============================================================================

/// One cleaning run kept in the session history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Sequence number, unique within the session.
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub config: CleaningConfig,
    pub report: CleaningReport,
}

// ============================================================================
// SESSION
// ============================================================================

/// The working state of one user.
#[derive(Debug, Default)]
pub struct Session {
    load_options: LoadOptions,
    original: Option<LoadedTable>,
    cleaned: Option<Table>,
    last_report: Option<CleaningReport>,
    history: Vec<HistoryEntry>,
    next_history_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that reads CSV input with the given options.
    pub fn with_load_options(load_options: LoadOptions) -> Result<Self> {
        load_options.validate()?;
        Ok(Self {
            load_options,
            ..Self::default()
        })
    }

    pub fn load_options(&self) -> &LoadOptions {
        &self.load_options
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Load a CSV file from disk.
    pub fn load_csv_path(&mut self, path: impl AsRef<Path>) -> Result<&SourceInfo> {
        let path = path.as_ref();
        let table = Table::from_csv_path(path, &self.load_options)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let size_bytes = std::fs::metadata(path).ok().map(|m| m.len());
        let source = SourceInfo::describe(name, Some(path.display().to_string()), size_bytes, &table);

        Ok(self.replace_original(LoadedTable { table, source }))
    }

    /// Load CSV content received from an upload.
    pub fn load_csv_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<&SourceInfo> {
        let table = Table::from_csv_bytes(bytes, &self.load_options)?;
        let source = SourceInfo::describe(name, None, Some(bytes.len() as u64), &table);
        Ok(self.replace_original(LoadedTable { table, source }))
    }

    /// Load the generated demo dataset.
    pub fn load_sample(&mut self, dataset: SampleDataset) -> Result<&SourceInfo> {
        let table = dataset.generate()?;
        let source = SourceInfo::describe("sample_data.csv", None, None, &table);
        Ok(self.replace_original(LoadedTable { table, source }))
    }

    /// Use an already built table as the original.
    pub fn load_table(&mut self, name: &str, table: Table) -> &SourceInfo {
        let source = SourceInfo::describe(name, None, None, &table);
        self.replace_original(LoadedTable { table, source })
    }

    fn replace_original(&mut self, loaded: LoadedTable) -> &SourceInfo {
        info!(
            "Loaded '{}': {} rows x {} columns",
            loaded.source.name, loaded.source.row_count, loaded.source.column_count
        );
        self.cleaned = None;
        self.last_report = None;
        self.history.clear();
        &self.original.insert(loaded).source
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn is_loaded(&self) -> bool {
        self.original.is_some()
    }

    /// The table as loaded.
    pub fn original(&self) -> Result<&Table> {
        self.loaded().map(|l| &l.table)
    }

    pub fn source(&self) -> Result<&SourceInfo> {
        self.loaded().map(|l| &l.source)
    }

    /// The most recent cleaned table, if cleaning ran since the last load.
    pub fn cleaned(&self) -> Option<&Table> {
        self.cleaned.as_ref()
    }

    /// The table downstream views should use: cleaned if present, else original.
    pub fn current(&self) -> Result<&Table> {
        match &self.cleaned {
            Some(table) => Ok(table),
            None => self.original(),
        }
    }

    pub fn last_report(&self) -> Option<&CleaningReport> {
        self.last_report.as_ref()
    }

    /// Cleaning runs since the last load, newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    fn loaded(&self) -> Result<&LoadedTable> {
        self.original.as_ref().ok_or(TidyError::NoDataLoaded)
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Profile the original table and list its quality issues.
    pub fn inspect(&self, z_threshold: f64) -> Result<(TableProfile, Vec<DataQualityIssue>)> {
        let table = self.original()?;
        let profile = DataProfiler::profile_table(table)?;
        let issues = DataQualityAnalyzer::identify_issues(table, &profile, z_threshold)?;
        Ok((profile, issues))
    }

    /// Clean the original table and make the result current.
    ///
    /// Cleaning never chains: each call starts again from the loaded table.
    /// On error the previous cleaned table and report are kept.
    pub fn apply_cleaning(&mut self, config: &CleaningConfig) -> Result<&CleaningReport> {
        let (cleaned, report) = clean(self.original()?, config)?;

        let entry = HistoryEntry {
            id: self.next_history_id,
            timestamp: Utc::now(),
            config: config.clone(),
            report: report.clone(),
        };
        self.next_history_id += 1;
        self.history.insert(0, entry);
        self.history.truncate(MAX_HISTORY_ENTRIES);

        self.cleaned = Some(cleaned);
        Ok(self.last_report.insert(report))
    }

    /// Discard the cleaned table so the original becomes current again.
    ///
    /// History is kept.
    pub fn reset_cleaning(&mut self) {
        self.cleaned = None;
        self.last_report = None;
    }

    /// Descriptive summary of the current table.
    pub fn summarize(&self) -> Result<Summary> {
        DescriptiveAnalyzer::summarize(self.current()?)
    }

    /// Write the current table as CSV.
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.current()?.write_csv(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingStrategy;
    use pretty_assertions::assert_eq;

    const CSV: &[u8] = b"name,score\nAna,1\nAna,1\nBen,\n";

    fn loaded_session() -> Session {
        let mut session = Session::new();
        session.load_csv_bytes("scores.csv", CSV).unwrap();
        session
    }

    fn dedup() -> CleaningConfig {
        CleaningConfig::builder().remove_duplicates(true).build().unwrap()
    }

    #[test]
    fn test_operations_require_data() {
        let mut session = Session::new();
        assert!(matches!(session.current(), Err(TidyError::NoDataLoaded)));
        assert!(matches!(session.summarize(), Err(TidyError::NoDataLoaded)));
        assert!(matches!(
            session.apply_cleaning(&dedup()),
            Err(TidyError::NoDataLoaded)
        ));
        let mut out = Vec::new();
        assert!(session.export_csv(&mut out).is_err());
    }

    #[test]
    fn test_load_bytes_source_info() {
        let session = loaded_session();
        let source = session.source().unwrap();
        assert_eq!(source.name, "scores.csv");
        assert_eq!(source.row_count, 3);
        assert_eq!(source.column_count, 2);
        assert_eq!(source.size_bytes, Some(CSV.len() as u64));
        assert_eq!(source.columns[1].null_count, 1);
        assert_eq!(source.columns[1].kind, ColumnKind::Numeric);
    }

    #[test]
    fn test_current_switches_to_cleaned() {
        let mut session = loaded_session();
        assert_eq!(session.current().unwrap().height(), 3);

        let report = session.apply_cleaning(&dedup()).unwrap();
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(session.current().unwrap().height(), 2);
        assert_eq!(session.original().unwrap().height(), 3);

        session.reset_cleaning();
        assert_eq!(session.current().unwrap().height(), 3);
        assert!(session.last_report().is_none());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_cleaning_starts_from_original() {
        let mut session = loaded_session();
        session.apply_cleaning(&dedup()).unwrap();

        let drop_rows = CleaningConfig::builder()
            .missing_strategy(MissingStrategy::DropRows)
            .build()
            .unwrap();
        let report = session.apply_cleaning(&drop_rows).unwrap();
        assert_eq!(report.shape_before, (3, 2));
        assert_eq!(report.duplicates_removed, 0);
        assert_eq!(session.current().unwrap().height(), 2);
    }

    #[test]
    fn test_history_is_bounded_newest_first() {
        let mut session = loaded_session();
        for _ in 0..(MAX_HISTORY_ENTRIES + 3) {
            session.apply_cleaning(&dedup()).unwrap();
        }
        let history = session.history();
        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(history[0].id, (MAX_HISTORY_ENTRIES + 2) as u64);
        assert!(history[0].timestamp >= history[1].timestamp);
    }

    #[test]
    fn test_failed_load_keeps_session() {
        let mut session = loaded_session();
        session.apply_cleaning(&dedup()).unwrap();

        assert!(session.load_csv_bytes("bad.csv", b"a,b\n1,2\n3,4,5,6\n").is_err());
        assert!(session.load_csv_path("/definitely/not/here.csv").is_err());

        assert_eq!(session.source().unwrap().name, "scores.csv");
        assert_eq!(session.current().unwrap().height(), 2);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_new_load_resets_cleaning() {
        let mut session = loaded_session();
        session.apply_cleaning(&dedup()).unwrap();

        session.load_sample(SampleDataset::default()).unwrap();
        assert!(session.cleaned().is_none());
        assert!(session.last_report().is_none());
        assert!(session.history().is_empty());
        assert_eq!(session.current().unwrap().height(), 50);
    }

    #[test]
    fn test_export_current_table() {
        let mut session = loaded_session();
        session.apply_cleaning(&dedup()).unwrap();

        let mut out = Vec::new();
        session.export_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("name,score"));
    }

    #[test]
    fn test_inspect_reports_duplicates() {
        let session = loaded_session();
        let (profile, issues) = session.inspect(3.0).unwrap();
        assert_eq!(profile.duplicate_count, 1);
        assert!(!issues.is_empty());
    }
}

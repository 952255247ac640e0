use polars::prelude::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::MissingStrategy;

// ============================================================================
// Column Kinds
// ============================================================================

/// Logical kind of a column, resolved once when a table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
    Boolean,
    Temporal,
}

impl ColumnKind {
    /// Classify a polars dtype.
    ///
    /// Anything that is not numeric, boolean or temporal is treated as text,
    /// including all-missing columns whose dtype is `Null`.
    pub fn from_dtype(dtype: &DataType) -> Self {
        match dtype {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64 => ColumnKind::Numeric,
            DataType::Boolean => ColumnKind::Boolean,
            DataType::Date | DataType::Datetime(_, _) | DataType::Time | DataType::Duration(_) => {
                ColumnKind::Temporal
            }
            _ => ColumnKind::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Temporal => "temporal",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Cleaning Report
// ============================================================================

/// Value written into missing cells by an imputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillValue::Number(v) => write!(f, "{:.2}", v),
            FillValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// A single column filled by the missing-value step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFill {
    pub column: String,
    pub value: FillValue,
    pub cells_filled: usize,
}

/// What the missing-value step did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MissingValueReport {
    pub strategy: MissingStrategy,
    /// Rows removed by `drop_rows`.
    pub rows_dropped: usize,
    /// Total cells written by a fill strategy.
    pub cells_filled: usize,
    pub columns_filled: Vec<ColumnFill>,
}

/// Rows removed by outlier filtering on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutliers {
    pub column: String,
    pub rows_removed: usize,
}

/// Summary of everything a cleaning run changed.
///
/// The report is serializable so a front end can show it next to the
/// cleaned table, and the CLI can write it as part of a JSON report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Shape (rows, columns) of the input table.
    pub shape_before: (usize, usize),
    /// Shape (rows, columns) of the cleaned table.
    pub shape_after: (usize, usize),

    /// Exact duplicate rows removed.
    pub duplicates_removed: usize,

    pub missing: MissingValueReport,

    /// Text columns that were trimmed and lowercased.
    pub text_columns_normalized: Vec<String>,

    /// Rows removed by the z-score filter, over all columns.
    pub outlier_rows_removed: usize,
    pub outliers_by_column: Vec<ColumnOutliers>,

    /// Human-readable log of each step, in execution order.
    pub steps: Vec<String>,
}

impl CleaningReport {
    pub fn new(shape_before: (usize, usize)) -> Self {
        Self {
            duration_ms: 0,
            shape_before,
            shape_after: shape_before,
            duplicates_removed: 0,
            missing: MissingValueReport::default(),
            text_columns_normalized: Vec::new(),
            outlier_rows_removed: 0,
            outliers_by_column: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Total rows removed by every step.
    pub fn rows_removed(&self) -> usize {
        self.shape_before.0.saturating_sub(self.shape_after.0)
    }

    /// Returns true when the cleaned table differs from the input.
    pub fn has_changes(&self) -> bool {
        self.rows_removed() > 0
            || self.missing.cells_filled > 0
            || !self.text_columns_normalized.is_empty()
    }
}

// ============================================================================
// Descriptive Statistics
// ============================================================================

/// Statistics of one numeric column over its non-missing values.
///
/// `None` means the statistic is undefined (no values, or a single value
/// for the standard deviation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub missing_count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// One distinct value of a text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
    /// Share of all rows (missing included), rounded to 2 decimals.
    pub percentage: f64,
}

/// Value counts of a text column, sorted by descending count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub column: String,
    pub total_rows: usize,
    pub missing_count: usize,
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyTable {
    /// Number of distinct non-missing values.
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    /// Keep only the `n` most frequent values.
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }
}

/// Pairwise Pearson correlations between numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `values[i][j]` is the correlation of `columns[i]` and `columns[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Mean of a numeric column for one category value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    pub group: String,
    pub mean: Option<f64>,
    /// Non-missing values that contributed to the mean.
    pub count: usize,
}

/// Everything the analysis page shows for a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub row_count: usize,
    pub column_count: usize,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub column_stats: Vec<ColumnStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationMatrix>,
    pub frequencies: Vec<FrequencyTable>,
}

impl Summary {
    pub fn stats_for(&self, column: &str) -> Option<&ColumnStats> {
        self.column_stats.iter().find(|s| s.column == column)
    }

    pub fn frequencies_for(&self, column: &str) -> Option<&FrequencyTable> {
        self.frequencies.iter().find(|f| f.column == column)
    }
}

// ============================================================================
// Chart Data
// ============================================================================

/// One bar of a histogram; `end` is inclusive only for the last bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Five-number summary for a box plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotSummary {
    pub column: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

// ============================================================================
// Profiling and Quality Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub missing_count: usize,
    pub missing_percentage: f64,
    pub unique_count: usize,
    pub sample_values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableProfile {
    pub shape: (usize, usize),
    pub column_profiles: Vec<ColumnProfile>,
    pub duplicate_count: usize,
    pub duplicate_percentage: f64,
    pub total_missing: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingValues,
    DuplicateRows,
    InconsistentText,
    PotentialOutliers,
    ConstantColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityIssue {
    pub issue_type: IssueKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub description: String,
    pub affected_count: usize,
    /// Up to five example values that triggered the issue.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub examples: Vec<String>,
}

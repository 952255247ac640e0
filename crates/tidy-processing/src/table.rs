//! The in-memory table and its CSV input/output.
//!
//! A [`Table`] wraps a polars [`DataFrame`] and records the [`ColumnKind`] of
//! every column. Kinds are resolved once when the table is built; cleaning
//! steps that change a column's dtype rebuild the table through
//! [`Table::from_dataframe`].

use crate::config::LoadOptions;
use crate::error::{Result, TidyError};
use crate::types::ColumnKind;
use polars::io::csv::read::NullValues;
use polars::prelude::*;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An ordered set of named columns of equal length.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    kinds: Vec<ColumnKind>,
}

impl Table {
    /// Wrap a DataFrame, resolving the kind of each column from its dtype.
    pub fn from_dataframe(df: DataFrame) -> Self {
        let kinds = df
            .get_columns()
            .iter()
            .map(|c| ColumnKind::from_dtype(c.dtype()))
            .collect();
        Self { df, kinds }
    }

    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self::from_dataframe(DataFrame::empty())
    }

    /// Read a comma-separated file with a header row.
    pub fn from_csv_path(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        options.validate()?;
        info!("Loading CSV from: {}", path.display());

        let df = csv_read_options(options)
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))
            .and_then(|reader| reader.finish())
            .map_err(|e| TidyError::CsvRead(format!("{}: {}", path.display(), e)))?;

        let table = Self::from_dataframe(df);
        debug!("Loaded table with shape {:?}", table.shape());
        Ok(table)
    }

    /// Read CSV content held in memory, e.g. an uploaded file.
    pub fn from_csv_bytes(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
        options.validate()?;

        let df = csv_read_options(options)
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()
            .map_err(|e| TidyError::CsvRead(e.to_string()))?;

        let table = Self::from_dataframe(df);
        debug!("Parsed CSV upload with shape {:?}", table.shape());
        Ok(table)
    }

    /// Write the table as CSV with a header row. Missing cells become empty fields.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut df = self.df.clone();
        CsvWriter::new(writer)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut df)?;
        Ok(())
    }

    /// Write the table to a CSV file, replacing it if it exists.
    pub fn write_csv_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path.as_ref())?;
        self.write_csv(&mut file)?;
        info!("Table saved: {}", path.as_ref().display());
        Ok(())
    }

    /// Render the table as CSV text.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| TidyError::Internal(e.to_string()))
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.df.shape()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Kind of each column, in column order.
    pub fn kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }

    /// Kind of a named column.
    pub fn kind(&self, name: &str) -> Result<ColumnKind> {
        let idx = self
            .df
            .get_column_index(name)
            .ok_or_else(|| TidyError::ColumnNotFound(name.to_string()))?;
        Ok(self.kinds[idx])
    }

    /// Names of every column of the given kind, in column order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .zip(&self.kinds)
            .filter(|(_, k)| **k == kind)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    pub fn text_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Text)
    }

    /// Borrow a column as a Series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        self.df
            .column(name)
            .map(|c| c.as_materialized_series())
            .map_err(|_| TidyError::ColumnNotFound(name.to_string()))
    }

    /// Borrow a column, checking that it has the expected kind.
    pub fn series_of_kind(&self, name: &str, expected: ColumnKind) -> Result<&Series> {
        let kind = self.kind(name)?;
        if kind != expected {
            return Err(TidyError::InvalidColumnKind {
                column: name.to_string(),
                expected: expected.to_string(),
            });
        }
        self.series(name)
    }

    /// Compare values and column order, treating missing as equal to missing.
    pub fn same_data(&self, other: &Table) -> bool {
        self.df.equals_missing(&other.df)
    }
}

impl From<DataFrame> for Table {
    fn from(df: DataFrame) -> Self {
        Table::from_dataframe(df)
    }
}

fn csv_read_options(options: &LoadOptions) -> CsvReadOptions {
    let null_values: Vec<PlSmallStr> = options
        .null_values
        .iter()
        .map(|s| PlSmallStr::from(s.as_str()))
        .collect();
    let try_parse_dates = options.try_parse_dates;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(options.infer_schema_length))
        .map_parse_options(|opts| {
            let opts = opts
                .with_separator(b',')
                .with_quote_char(Some(b'"'))
                .with_try_parse_dates(try_parse_dates);
            if null_values.is_empty() {
                opts
            } else {
                opts.with_null_values(Some(NullValues::AllColumns(null_values.clone())))
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUDENTS: &str = "id,name,score,passed\n1,Ann,90.5,true\n2,Bob,,false\n3,NA,70.0,true\n";

    #[test]
    fn test_from_csv_bytes_resolves_kinds() {
        let table = Table::from_csv_bytes(STUDENTS.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(table.shape(), (3, 4));
        assert_eq!(
            table.kinds(),
            &[
                ColumnKind::Numeric,
                ColumnKind::Text,
                ColumnKind::Numeric,
                ColumnKind::Boolean
            ]
        );
        assert_eq!(table.numeric_columns(), vec!["id", "score"]);
        assert_eq!(table.text_columns(), vec!["name"]);
    }

    #[test]
    fn test_missing_markers_become_null() {
        let table = Table::from_csv_bytes(STUDENTS.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(table.series("score").unwrap().null_count(), 1);
        assert_eq!(table.series("name").unwrap().null_count(), 1);
    }

    #[test]
    fn test_custom_null_markers() {
        let csv = "name,score\nAnn,missing\nNA,70\n";
        let options = LoadOptions {
            null_values: vec!["missing".to_string()],
            ..LoadOptions::default()
        };
        let table = Table::from_csv_bytes(csv.as_bytes(), &options).unwrap();
        assert_eq!(table.series("score").unwrap().null_count(), 1);
        assert_eq!(table.kind("score").unwrap(), ColumnKind::Numeric);
        // "NA" is only a marker when listed.
        assert_eq!(table.series("name").unwrap().null_count(), 0);

        let no_markers = LoadOptions {
            null_values: Vec::new(),
            ..LoadOptions::default()
        };
        let table = Table::from_csv_bytes(csv.as_bytes(), &no_markers).unwrap();
        assert_eq!(table.kind("score").unwrap(), ColumnKind::Text);
    }

    #[test]
    fn test_date_columns_are_temporal() {
        let csv = "day,value\n2024-01-01,1\n2024-01-02,2\n";
        let table = Table::from_csv_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(table.kind("day").unwrap(), ColumnKind::Temporal);

        let raw = Table::from_csv_bytes(
            csv.as_bytes(),
            &LoadOptions::default().with_try_parse_dates(false),
        )
        .unwrap();
        assert_eq!(raw.kind("day").unwrap(), ColumnKind::Text);
    }

    #[test]
    fn test_malformed_csv_is_recoverable_error() {
        let csv = "a,b\n1,2\n3,4,5,6\n";
        let err = Table::from_csv_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert_eq!(err.error_code(), "CSV_READ_FAILED");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_missing_file_is_csv_error() {
        let err = Table::from_csv_path("/nonexistent/data.csv", &LoadOptions::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "CSV_READ_FAILED");
    }

    #[test]
    fn test_unknown_column_and_wrong_kind() {
        let table = Table::from_csv_bytes(STUDENTS.as_bytes(), &LoadOptions::default()).unwrap();
        assert!(matches!(
            table.kind("nope"),
            Err(TidyError::ColumnNotFound(_))
        ));
        assert!(matches!(
            table.series_of_kind("name", ColumnKind::Numeric),
            Err(TidyError::InvalidColumnKind { .. })
        ));
    }

    #[test]
    fn test_csv_round_trip() {
        let table = Table::from_csv_bytes(STUDENTS.as_bytes(), &LoadOptions::default()).unwrap();
        let csv = table.to_csv_string().unwrap();
        let reloaded = Table::from_csv_bytes(csv.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(reloaded.column_names(), table.column_names());
        assert!(reloaded.same_data(&table));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::empty();
        assert!(table.is_empty());
        assert_eq!(table.shape(), (0, 0));
        assert!(table.numeric_columns().is_empty());
    }
}

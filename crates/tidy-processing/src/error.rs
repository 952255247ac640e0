//! Custom error types for loading, cleaning and analyzing tables.
//!
//! This module provides the error hierarchy using `thiserror` so every
//! failure carries enough context for a front end to show it.
//!
//! Errors are serializable as `{code, message}`, allowing them to be sent
//! to a UI layer or printed as JSON by the CLI.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the library.
#[derive(Error, Debug)]
pub enum TidyError {
    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Column exists but has the wrong kind for the requested operation.
    #[error("Column '{column}' is not a {expected} column")]
    InvalidColumnKind { column: String, expected: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The CSV input could not be parsed into a table.
    #[error("Failed to read CSV: {0}")]
    CsvRead(String),

    /// No table loaded in the session.
    #[error("No data loaded")]
    NoDataLoaded,

    /// Internal invariant violated.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<TidyError>,
    },
}

impl TidyError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        TidyError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidColumnKind { .. } => "INVALID_COLUMN_KIND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::CsvRead(_) => "CSV_READ_FAILED",
            Self::NoDataLoaded => "NO_DATA_LOADED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is recoverable, meaning the user can fix the input
    /// and retry without restarting the session.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::InvalidColumnKind { .. }
            | Self::InvalidConfig(_)
            | Self::CsvRead(_)
            | Self::NoDataLoaded => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for TidyError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("TidyError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, TidyError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| TidyError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(TidyError::NoDataLoaded.error_code(), "NO_DATA_LOADED");
        assert_eq!(
            TidyError::ColumnNotFound("age".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            TidyError::InvalidColumnKind {
                column: "name".to_string(),
                expected: "numeric".to_string(),
            }
            .error_code(),
            "INVALID_COLUMN_KIND"
        );
    }

    #[test]
    fn test_is_recoverable() {
        assert!(TidyError::NoDataLoaded.is_recoverable());
        assert!(TidyError::CsvRead("bad quote".to_string()).is_recoverable());
        assert!(!TidyError::Internal("boom".to_string()).is_recoverable());
        assert!(
            TidyError::CsvRead("x".to_string())
                .with_context("Loading upload")
                .is_recoverable()
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = TidyError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context() {
        let error = TidyError::ColumnNotFound("test".to_string()).with_context("During analysis");
        assert!(error.to_string().contains("During analysis"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }
}

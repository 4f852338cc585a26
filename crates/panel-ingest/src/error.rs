//! Error types for panel data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing panel files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    // === CSV Errors ===
    /// The csv reader or writer failed.
    #[error("failed to process CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// CSV file has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Two header cells clean to the same column name.
    #[error("duplicate column '{column}' in {path}")]
    DuplicateHeader { column: String, path: PathBuf },

    // === Crosswalk Errors ===
    /// Required column not found in the file.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// A crosswalk cell is not an integer identifier.
    #[error("invalid {field} value '{value}' in {path} (row {row})")]
    InvalidValue {
        field: String,
        value: String,
        row: usize,
        path: PathBuf,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::MissingColumn {
            column: "NEW IDS".to_string(),
            path: PathBuf::from("/data/ids.csv"),
        };
        assert_eq!(
            err.to_string(),
            "required column 'NEW IDS' not found in /data/ids.csv"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("id".into());
        let err: IngestError = polars_err.into();
        assert!(matches!(err, IngestError::DataFrame { .. }));
    }
}

//! Error types shared by the pipeline crates.

use thiserror::Error;

/// Fatal errors raised by pipeline stages.
///
/// Tolerated conditions (unmapped values, absent selector columns, numeric
/// parse failures) are reported as [`crate::Diagnostic`]s instead.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Caller misuse such as a malformed column selector or regex pattern.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A column the stage cannot work without is absent.
    #[error("required column '{column}' not found")]
    MissingColumn { column: String },

    /// The stage received no usable rows.
    #[error("no usable rows for {what}")]
    EmptyInput { what: String },

    /// Configuration could not be parsed.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl PanelError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for PanelError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PanelError>;

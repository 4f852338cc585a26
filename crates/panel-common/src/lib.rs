//! Shared utilities for the panel survey crates.
//!
//! This crate provides common utilities used across the workspace,
//! mostly Polars `AnyValue` and column helpers, plus log redaction.

pub mod cells;
pub mod redact;

pub use cells::{
    any_to_f64, any_to_string, any_to_string_non_empty, cell_key, column_cell_keys,
    column_strings, column_value_string, format_numeric, parse_f64,
};
pub use redact::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data};

//! Value-level transforms for panel survey frames.
//!
//! Every function takes a frame by reference and returns a new frame plus
//! the diagnostics it produced.

pub mod columns;
pub mod demographics;
pub mod likert;
pub mod mapper;
pub mod numeric;

pub use columns::{add_prefix, drop_anonymized, rename_substrings};
pub use demographics::{
    DemographicsOutcome, compile_patterns, field_patterns, matching_columns, normalize_demographics,
};
pub use likert::{LikertOutcome, transform_likert};
pub use mapper::{MapOptions, MapOutcome, map_values};
pub use numeric::{CoercionOutcome, NumericToken, coerce_numeric, coerce_values};

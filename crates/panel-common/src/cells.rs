//! Polars AnyValue utility functions.
//!
//! This module provides helper functions for working with Polars `AnyValue` types,
//! including string conversions, numeric parsing and comparison keys.

use polars::prelude::{AnyValue, DataFrame};

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null`, properly formats numeric types without
/// unnecessary trailing zeros.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use panel_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
/// assert_eq!(any_to_string(AnyValue::Float64(4.0)), "4");
/// assert_eq!(any_to_string(AnyValue::String("Agree")), "Agree");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "True" } else { "False" }.to_string(),
        other => other.to_string(),
    }
}

/// Converts `AnyValue` to `String`, returning `None` for nulls and blank text.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use panel_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(4.5), "4.5");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Converts an `AnyValue` to `f64`, returning `None` for non-numeric, null or NaN values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    let number = match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    };
    number.filter(|v| !v.is_nan())
}

/// Parses a string as `f64`, returning `None` for invalid, empty or NaN strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Builds a comparison key for a cell.
///
/// Numeric-looking values collapse to their canonical numeric text so that
/// `"4"`, `"4.0"` and `Float64(4.0)` compare equal; other text is trimmed.
/// Missing cells have no key.
pub fn cell_key(value: AnyValue<'_>) -> Option<String> {
    let text = any_to_string_non_empty(value)?;
    match parse_f64(&text) {
        Some(number) => Some(format_numeric(number)),
        None => Some(text.trim().to_string()),
    }
}

/// Get a string value from a DataFrame column at the given row index.
pub fn column_value_string(df: &DataFrame, name: &str, idx: usize) -> String {
    match df.column(name) {
        Ok(column) => any_to_string(column.get(idx).unwrap_or(AnyValue::Null)),
        Err(_) => String::new(),
    }
}

/// Extract all values of a column as optional strings (nulls stay `None`).
pub fn column_strings(df: &DataFrame, name: &str) -> Option<Vec<Option<String>>> {
    let column = df.column(name).ok()?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        values.push(match value {
            AnyValue::Null => None,
            other => Some(any_to_string(other)),
        });
    }
    Some(values)
}

/// Extract comparison keys for every row of a column (see [`cell_key`]).
pub fn column_cell_keys(df: &DataFrame, name: &str) -> Option<Vec<Option<String>>> {
    let column = df.column(name).ok()?;
    let mut keys = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        keys.push(cell_key(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Some(keys)
}

#[cfg(test)]
mod tests {
    use polars::prelude::{NamedFrom, Series};

    use super::*;

    #[test]
    fn test_any_to_string_null() {
        assert_eq!(any_to_string(AnyValue::Null), "");
    }

    #[test]
    fn test_any_to_string_floats() {
        assert_eq!(any_to_string(AnyValue::Float64(1.5)), "1.5");
        assert_eq!(any_to_string(AnyValue::Float64(1.0)), "1");
        assert_eq!(any_to_string(AnyValue::Float64(100.0)), "100");
    }

    #[test]
    fn test_any_to_string_non_empty() {
        assert_eq!(any_to_string_non_empty(AnyValue::Null), None);
        assert_eq!(any_to_string_non_empty(AnyValue::String("  ")), None);
        assert_eq!(
            any_to_string_non_empty(AnyValue::String("Agree")),
            Some("Agree".to_string())
        );
    }

    #[test]
    fn test_format_numeric_keeps_integers_intact() {
        assert_eq!(format_numeric(10.0), "10");
        assert_eq!(format_numeric(1000.0), "1000");
        assert_eq!(format_numeric(-2.50), "-2.5");
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("  3.5  "), Some(3.5));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("Agree"), None);
    }

    #[test]
    fn test_cell_key_unifies_numeric_text() {
        assert_eq!(cell_key(AnyValue::String("4.0")), Some("4".to_string()));
        assert_eq!(cell_key(AnyValue::Float64(4.0)), Some("4".to_string()));
        assert_eq!(cell_key(AnyValue::String(" yes ")), Some("yes".to_string()));
        assert_eq!(cell_key(AnyValue::Null), None);
    }

    #[test]
    fn test_column_strings_keeps_nulls() {
        let series = Series::new("a".into(), vec![Some("x"), None]);
        let df = DataFrame::new(vec![series.into()]).unwrap();
        let values = column_strings(&df, "a").unwrap();
        assert_eq!(values, vec![Some("x".to_string()), None]);
        assert!(column_strings(&df, "missing").is_none());
    }
}

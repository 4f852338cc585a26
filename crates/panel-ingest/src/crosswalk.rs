//! Respondent-ID crosswalk linking wave-1 and wave-2 identifiers.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use tracing::debug;

use panel_common::parse_f64;
use panel_model::CrosswalkConfig;

use crate::error::{IngestError, Result};

fn column_index(headers: &StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.trim_matches('\u{feff}').trim() == name)
        .ok_or_else(|| IngestError::MissingColumn {
            column: name.to_string(),
            path: path.to_path_buf(),
        })
}

/// Parse an integer-like identifier (`"12"`, `"12.0"`); blank is missing.
fn parse_identifier(raw: &str) -> Option<std::result::Result<i64, ()>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(Ok(value));
    }
    match parse_f64(trimmed) {
        Some(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => Some(Ok(value as i64)),
        _ => Some(Err(())),
    }
}

/// Read the semicolon-delimited crosswalk.
///
/// Only the two identifier columns are kept, as nullable `Int64` columns
/// under their original names.
pub fn read_crosswalk(path: &Path, config: &CrosswalkConfig) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(b';')
        .from_path(path)
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    let headers = reader
        .headers()
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let new_idx = column_index(&headers, &config.new_id_column, path)?;
    let old_idx = column_index(&headers, &config.old_id_column, path)?;

    let mut new_ids: Vec<Option<i64>> = Vec::new();
    let mut old_ids: Vec<Option<i64>> = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        for (idx, field, target) in [
            (new_idx, &config.new_id_column, &mut new_ids),
            (old_idx, &config.old_id_column, &mut old_ids),
        ] {
            let raw = record.get(idx).unwrap_or("");
            match parse_identifier(raw) {
                None => target.push(None),
                Some(Ok(value)) => target.push(Some(value)),
                Some(Err(())) => {
                    return Err(IngestError::InvalidValue {
                        field: field.clone(),
                        value: raw.to_string(),
                        row: row + 1,
                        path: path.to_path_buf(),
                    });
                }
            }
        }
    }

    let columns: Vec<Column> = vec![
        Series::new(config.new_id_column.as_str().into(), new_ids).into(),
        Series::new(config.old_id_column.as_str().into(), old_ids).into(),
    ];
    let df = DataFrame::new(columns)?;
    debug!(path = %path.display(), rows = df.height(), "loaded crosswalk");
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier() {
        assert_eq!(parse_identifier(""), None);
        assert_eq!(parse_identifier(" 12 "), Some(Ok(12)));
        assert_eq!(parse_identifier("12.0"), Some(Ok(12)));
        assert_eq!(parse_identifier("12.5"), Some(Err(())));
        assert_eq!(parse_identifier("abc"), Some(Err(())));
    }
}

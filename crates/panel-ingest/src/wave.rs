//! Survey-platform wave exports.

use std::collections::BTreeSet;
use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Options for reading a wave export.
#[derive(Debug, Clone, Copy)]
pub struct WaveReadOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Platform metadata rows that follow the header (question text, import ids).
    pub metadata_rows: usize,
}

impl Default for WaveReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            metadata_rows: 2,
        }
    }
}

/// Clean a header cell: drop the BOM, every `.` and all whitespace.
///
/// `Duration (in seconds)` becomes `Duration(inseconds)`.
pub fn clean_header(raw: &str) -> String {
    raw.trim_matches('\u{feff}')
        .chars()
        .filter(|ch| *ch != '.' && !ch.is_whitespace())
        .collect()
}

fn normalize_cell(raw: &str) -> Option<String> {
    let value = raw.trim_matches('\u{feff}');
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Read a wave export with the default options.
pub fn read_wave_csv(path: &Path) -> Result<DataFrame> {
    read_wave_csv_with_options(path, WaveReadOptions::default())
}

/// Read a wave export into a frame of text columns.
///
/// Empty cells become missing. Short rows are padded with missing cells and
/// extra trailing cells are ignored.
pub fn read_wave_csv_with_options(path: &Path, options: WaveReadOptions) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_path(path)
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?,
        None => {
            return Err(IngestError::EmptyCsv {
                path: path.to_path_buf(),
            });
        }
    };
    let headers: Vec<String> = header.iter().map(clean_header).collect();
    let mut seen = BTreeSet::new();
    for name in &headers {
        if !seen.insert(name.as_str()) {
            return Err(IngestError::DuplicateHeader {
                column: name.clone(),
                path: path.to_path_buf(),
            });
        }
    }

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut skipped = 0usize;
    for record in records {
        let record = record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if skipped < options.metadata_rows {
            skipped += 1;
            continue;
        }
        for (idx, column) in values.iter_mut().enumerate() {
            column.push(record.get(idx).and_then(normalize_cell));
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(values)
        .map(|(name, column)| Series::new(name.as_str().into(), column).into())
        .collect();
    let df = DataFrame::new(columns)?;
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        metadata_rows = skipped,
        "loaded wave export"
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_header() {
        assert_eq!(clean_header("Duration (in seconds)"), "Duration(inseconds)");
        assert_eq!(clean_header("Q.1 a"), "Q1a");
        assert_eq!(clean_header("\u{feff}StartDate"), "StartDate");
    }

    #[test]
    fn test_normalize_cell() {
        assert_eq!(normalize_cell(""), None);
        assert_eq!(normalize_cell("   "), None);
        assert_eq!(normalize_cell(" Agree"), Some(" Agree".to_string()));
    }
}

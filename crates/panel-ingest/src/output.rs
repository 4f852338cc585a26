//! Writing the merged panel table.

use std::path::Path;

use csv::WriterBuilder;
use polars::prelude::{AnyValue, DataFrame};
use tracing::info;

use panel_common::any_to_string;

use crate::error::{IngestError, Result};

/// Write a frame as comma-delimited CSV with a header row.
///
/// Missing cells are written as empty fields.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let csv_err = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = WriterBuilder::new().from_path(path).map_err(csv_err)?;
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    writer.write_record(&names).map_err(csv_err)?;

    let columns = df.get_columns();
    let mut record: Vec<String> = Vec::with_capacity(columns.len());
    for idx in 0..df.height() {
        record.clear();
        for column in columns {
            record.push(any_to_string(column.get(idx).unwrap_or(AnyValue::Null)));
        }
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|err| csv_err(csv::Error::from(err)))?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "wrote panel output"
    );
    Ok(())
}

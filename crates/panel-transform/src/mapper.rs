//! Value Mapper: replace cell values through a mapping table.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use tracing::debug;

use panel_common::{any_to_f64, any_to_string, format_numeric, parse_f64};
use panel_model::{
    ColumnSelector, Diagnostic, MappedValue, MappingTable, Result, UnmappedValue,
};

use crate::numeric::missing_column_diagnostics;

/// How mapped columns are materialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapOptions {
    /// Coerce the result to `Float64`; anything unparsable becomes missing.
    pub numeric: bool,
}

impl MapOptions {
    pub fn numeric() -> Self {
        Self { numeric: true }
    }
}

/// Result of a mapping pass.
#[derive(Debug, Clone)]
pub struct MapOutcome {
    pub frame: DataFrame,
    /// Columns the table was applied to.
    pub columns: Vec<String>,
    /// Cells whose value was replaced by a table entry.
    pub mapped_cells: usize,
    /// Distinct non-missing values without a table entry, per column.
    pub unmapped: Vec<UnmappedValue>,
    pub diagnostics: Vec<Diagnostic>,
}

enum Cell {
    Text(Option<String>),
    Number(Option<f64>),
}

/// Apply `table` to the selected columns.
///
/// Matching cells take the mapped value. In plain mode unmatched cells are
/// kept as they are; in numeric mode they are parsed and become missing when
/// they are not numbers. Columns in which nothing changes keep their dtype.
pub fn map_values(
    df: &DataFrame,
    table: &MappingTable,
    selector: &ColumnSelector,
    options: MapOptions,
) -> Result<MapOutcome> {
    let available = df.get_column_names_owned();
    let resolved = selector.resolve(&available);
    let diagnostics = missing_column_diagnostics(&resolved.missing, table.name());

    let mut frame = df.clone();
    let mut mapped_cells = 0usize;
    let mut unmapped = Vec::new();
    for name in &resolved.present {
        let series = frame.column(name)?.as_materialized_series().clone();
        let mut column_unmapped: BTreeMap<String, usize> = BTreeMap::new();
        let mut column_mapped = 0usize;
        let mut cells = Vec::with_capacity(series.len());
        for idx in 0..series.len() {
            let value = series.get(idx).unwrap_or(AnyValue::Null);
            let cell = match &value {
                AnyValue::Null => None,
                other => Some(any_to_string(other.clone())),
            };
            let hit = cell.as_deref().and_then(|raw| table.get(raw));
            match (hit, cell) {
                (Some(mapped), _) => {
                    column_mapped += 1;
                    cells.push(match mapped {
                        MappedValue::Text(text) => Cell::Text(Some(text.clone())),
                        MappedValue::Number(number) => Cell::Number(Some(*number)),
                        MappedValue::Missing => Cell::Text(None),
                    });
                }
                (None, Some(raw)) => {
                    if !raw.trim().is_empty() {
                        *column_unmapped.entry(raw.trim().to_string()).or_default() += 1;
                    }
                    if options.numeric {
                        cells.push(Cell::Number(any_to_f64(value)));
                    } else {
                        cells.push(Cell::Text(Some(raw)));
                    }
                }
                (None, None) => cells.push(Cell::Text(None)),
            }
        }

        unmapped.extend(
            column_unmapped
                .into_iter()
                .map(|(value, count)| UnmappedValue {
                    column: name.clone(),
                    value,
                    count,
                }),
        );
        mapped_cells += column_mapped;
        if options.numeric {
            let values: Vec<Option<f64>> = cells
                .into_iter()
                .map(|cell| match cell {
                    Cell::Number(number) => number,
                    Cell::Text(text) => text.as_deref().and_then(parse_f64),
                })
                .collect();
            frame.with_column(Series::new(name.as_str().into(), values))?;
        } else if column_mapped > 0 {
            let values: Vec<Option<String>> = cells
                .into_iter()
                .map(|cell| match cell {
                    Cell::Number(number) => number.map(format_numeric),
                    Cell::Text(text) => text,
                })
                .collect();
            frame.with_column(Series::new(name.as_str().into(), values))?;
        }
    }
    debug!(
        table = table.name(),
        columns = resolved.present.len(),
        mapped_cells,
        unmapped_values = unmapped.len(),
        "applied mapping table"
    );
    Ok(MapOutcome {
        frame,
        columns: resolved.present,
        mapped_cells,
        unmapped,
        diagnostics,
    })
}

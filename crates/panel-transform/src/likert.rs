//! Likert transform: anchor labels to numbers on the 1-6 scales.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use tracing::{debug, warn};

use panel_common::any_to_string_non_empty;
use panel_model::{
    ColumnSelector, Diagnostic, LIKERT_UNKNOWN_SENTINEL, MappedValue, MappingTable, Result,
    UnmappedValue,
};

use crate::numeric::{NumericToken, missing_column_diagnostics};

#[derive(Debug, Clone)]
pub struct LikertOutcome {
    pub frame: DataFrame,
    pub columns: Vec<String>,
    /// Non-missing answers that ended up missing (sentinel, discarded label, no number).
    pub discarded_cells: usize,
    /// Answers that are neither an anchor label nor carry a number.
    pub unmapped: Vec<UnmappedValue>,
    /// Absent columns and one warning per unmapped answer.
    pub diagnostics: Vec<Diagnostic>,
}

/// Answers that are missing on purpose: the sentinel and discarded labels.
fn intentionally_missing(trimmed: &str, table: &MappingTable) -> bool {
    trimmed == LIKERT_UNKNOWN_SENTINEL || matches!(table.get(trimmed), Some(MappedValue::Missing))
}

fn likert_value(raw: &str, table: &MappingTable, token: &NumericToken) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == LIKERT_UNKNOWN_SENTINEL {
        return None;
    }
    match table.get(trimmed) {
        Some(MappedValue::Number(number)) => Some(*number),
        Some(MappedValue::Missing) => None,
        Some(MappedValue::Text(text)) => token.extract(text),
        None => token.extract(trimmed),
    }
}

/// Recode the listed Likert columns to `Float64`.
///
/// Anchor labels go through `table`; anything else yields the first number
/// embedded in the text, or missing when there is none. The unknown
/// sentinel is always missing. Absent columns are reported and skipped.
pub fn transform_likert(
    df: &DataFrame,
    table: &MappingTable,
    columns: &[String],
) -> Result<LikertOutcome> {
    let token = NumericToken::new()?;
    let available = df.get_column_names_owned();
    let resolved = ColumnSelector::Named(columns.to_vec()).resolve(&available);
    let mut diagnostics = missing_column_diagnostics(&resolved.missing, "likert");

    let mut frame = df.clone();
    let mut discarded_cells = 0usize;
    let mut unmapped = Vec::new();
    for name in &resolved.present {
        let series = frame.column(name)?.as_materialized_series().clone();
        let mut column_unmapped: BTreeMap<String, usize> = BTreeMap::new();
        let mut values: Vec<Option<f64>> = Vec::with_capacity(series.len());
        for idx in 0..series.len() {
            let Some(raw) = any_to_string_non_empty(series.get(idx).unwrap_or(AnyValue::Null))
            else {
                values.push(None);
                continue;
            };
            let value = likert_value(&raw, table, &token);
            if value.is_none() {
                discarded_cells += 1;
                let trimmed = raw.trim();
                if !intentionally_missing(trimmed, table) {
                    *column_unmapped.entry(trimmed.to_string()).or_default() += 1;
                }
            }
            values.push(value);
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
        frame.with_column(Series::new(name.as_str().into(), values))?;
    }
    for entry in &unmapped {
        warn!(
            column = %entry.column,
            value = %entry.value,
            count = entry.count,
            "likert answer without a number"
        );
        diagnostics.push(entry.to_diagnostic());
    }
    debug!(
        columns = resolved.present.len(),
        discarded_cells,
        unmapped_values = unmapped.len(),
        "recoded likert columns"
    );
    Ok(LikertOutcome {
        frame,
        columns: resolved.present,
        discarded_cells,
        unmapped,
        diagnostics,
    })
}

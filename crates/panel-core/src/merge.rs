//! Wave Merger: crosswalk ⨝ wave 1 ⨝ wave 2.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{DataFrame, IdxCa, IdxSize, NamedFrom, NewChunkedArray, Series};
use tracing::{info, warn};

use panel_common::column_cell_keys;
use panel_model::{Diagnostic, DiagnosticKind, PanelError, PipelineConfig, Result};

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub frame: DataFrame,
    pub crosswalk_rows: usize,
    pub first_rows: usize,
    pub second_rows: usize,
    pub diagnostics: Vec<Diagnostic>,
}

fn required_keys(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    column_cell_keys(df, column).ok_or_else(|| PanelError::MissingColumn {
        column: column.to_string(),
    })
}

fn positions(keys: &[Option<String>]) -> BTreeMap<&str, Vec<usize>> {
    let mut index: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (row, key) in keys.iter().enumerate() {
        if let Some(key) = key.as_deref() {
            index.entry(key).or_default().push(row);
        }
    }
    index
}

fn duplicate_count<T: Ord>(values: impl IntoIterator<Item = T>) -> usize {
    let mut seen = BTreeSet::new();
    let mut duplicates = 0usize;
    for value in values {
        if !seen.insert(value) {
            duplicates += 1;
        }
    }
    duplicates
}

/// Sanity checks on the merge inputs; violations become warnings.
pub fn check_merge_inputs(
    new_ids: &[Option<String>],
    old_ids: &[Option<String>],
    first_ids: &[Option<String>],
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let duplicate_rows = duplicate_count(new_ids.iter().zip(old_ids));
    if duplicate_rows > 0 {
        warn!(duplicate_rows, "crosswalk contains duplicate rows");
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::DuplicateCrosswalkRows,
                format!("crosswalk contains {duplicate_rows} duplicate rows"),
            )
            .with_count(duplicate_rows),
        );
    }

    let duplicate_ids = duplicate_count(first_ids.iter().flatten());
    if duplicate_ids > 0 {
        warn!(duplicate_ids, "wave 1 identifiers are not unique");
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::DuplicateWaveIdentifiers,
                format!("wave 1 contains {duplicate_ids} repeated identifiers"),
            )
            .with_count(duplicate_ids),
        );
    }

    let known: BTreeSet<&str> = first_ids.iter().flatten().map(String::as_str).collect();
    let old: Vec<&str> = old_ids.iter().flatten().map(String::as_str).collect();
    let absent = old.iter().filter(|id| !known.contains(*id)).count();
    if !old.is_empty() && absent == old.len() {
        warn!(absent, "no crosswalk old identifier occurs in wave 1");
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::CrosswalkMismatch,
                "no crosswalk old identifier occurs in wave 1, the files may come from different exports",
            )
            .with_count(absent),
        );
    } else if absent > 0 {
        diagnostics.push(
            Diagnostic::info(
                DiagnosticKind::CrosswalkMismatch,
                format!("{absent} crosswalk old identifiers do not occur in wave 1"),
            )
            .with_count(absent),
        );
    }
    diagnostics
}

fn take_rows(df: &DataFrame, rows: Vec<IdxSize>) -> Result<DataFrame> {
    let indices = IdxCa::from_vec("rows".into(), rows);
    Ok(df.take(&indices)?)
}

/// Inner-join the crosswalk with both prefixed waves and number the result.
///
/// Rows follow crosswalk order. Keys compare by value, so `7`, `"7"` and
/// `7.0` match; missing keys never match. `respondent_id` runs 1..=N.
pub fn merge_waves(
    crosswalk: &DataFrame,
    first: &DataFrame,
    second: &DataFrame,
    config: &PipelineConfig,
) -> Result<MergeOutcome> {
    let first_link = config.first_wave().prefixed(&config.first_wave().link_column);
    let second_link = config.second_wave().prefixed(&config.second_wave().link_column);
    let new_ids = required_keys(crosswalk, &config.crosswalk.new_id_column)?;
    let old_ids = required_keys(crosswalk, &config.crosswalk.old_id_column)?;
    let first_ids = required_keys(first, &first_link)?;
    let second_ids = required_keys(second, &second_link)?;

    let diagnostics = check_merge_inputs(&new_ids, &old_ids, &first_ids);

    let first_index = positions(&first_ids);
    let second_index = positions(&second_ids);
    let mut crosswalk_rows: Vec<IdxSize> = Vec::new();
    let mut first_rows: Vec<IdxSize> = Vec::new();
    let mut second_rows: Vec<IdxSize> = Vec::new();
    for (row, (new_id, old_id)) in new_ids.iter().zip(&old_ids).enumerate() {
        let (Some(new_id), Some(old_id)) = (new_id.as_deref(), old_id.as_deref()) else {
            continue;
        };
        let (Some(first_matches), Some(second_matches)) =
            (first_index.get(new_id), second_index.get(old_id))
        else {
            continue;
        };
        for &first_row in first_matches {
            for &second_row in second_matches {
                crosswalk_rows.push(row as IdxSize);
                first_rows.push(first_row as IdxSize);
                second_rows.push(second_row as IdxSize);
            }
        }
    }

    let merged = take_rows(crosswalk, crosswalk_rows)?;
    let merged = merged.hstack(take_rows(first, first_rows)?.get_columns())?;
    let mut merged = merged.hstack(take_rows(second, second_rows)?.get_columns())?;
    let respondent_ids: Vec<i64> = (1..=merged.height() as i64).collect();
    merged.with_column(Series::new(
        config.respondent_id_column.as_str().into(),
        respondent_ids,
    ))?;
    info!(
        crosswalk_rows = crosswalk.height(),
        first_rows = first.height(),
        second_rows = second.height(),
        merged_rows = merged.height(),
        "merged waves"
    );
    Ok(MergeOutcome {
        frame: merged,
        crosswalk_rows: crosswalk.height(),
        first_rows: first.height(),
        second_rows: second.height(),
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_check_merge_inputs_clean() {
        let diagnostics = check_merge_inputs(
            &keys(&[Some("1"), Some("2")]),
            &keys(&[Some("1"), Some("2")]),
            &keys(&[Some("1"), Some("2"), Some("3")]),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_check_merge_inputs_violations() {
        let diagnostics = check_merge_inputs(
            &keys(&[Some("1"), Some("1"), Some("2")]),
            &keys(&[Some("10"), Some("10"), Some("20")]),
            &keys(&[Some("1"), Some("1"), Some("2")]),
        );
        let kinds: Vec<DiagnosticKind> = diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::DuplicateCrosswalkRows,
                DiagnosticKind::DuplicateWaveIdentifiers,
                DiagnosticKind::CrosswalkMismatch,
            ]
        );
        assert_eq!(diagnostics[2].severity, panel_model::Severity::Warning);
        assert_eq!(diagnostics[2].count, Some(3));
    }
}

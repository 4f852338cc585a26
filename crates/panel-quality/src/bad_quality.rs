//! Bad-quality filter on the raw platform status columns.

use polars::prelude::DataFrame;
use tracing::{info, info_span};

use panel_common::column_cell_keys;
use panel_model::{BadQualityConfig, Diagnostic, DiagnosticKind, Result};

use crate::FilterOutcome;
use crate::mask::{count_excluded, retain_rows};

fn is_false_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("false") || value == "0"
}

fn absent(column: &str) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticKind::MissingColumn,
        format!("column {column} is not present, bad-quality criterion skipped"),
    )
    .with_column(column)
}

fn flag_where(
    df: &DataFrame,
    column: &str,
    excluded: &mut [bool],
    diagnostics: &mut Vec<Diagnostic>,
    is_bad: impl Fn(&str) -> bool,
) {
    let Some(keys) = column_cell_keys(df, column) else {
        diagnostics.push(absent(column));
        return;
    };
    for (flag, key) in excluded.iter_mut().zip(keys) {
        if key.as_deref().is_some_and(&is_bad) {
            *flag = true;
        }
    }
}

/// Flag preview submissions, unfinished responses and terminated responses.
///
/// A criterion whose column is absent flags nobody.
pub fn bad_quality_flags(df: &DataFrame, config: &BadQualityConfig) -> (Vec<bool>, Vec<Diagnostic>) {
    let mut excluded = vec![false; df.height()];
    let mut diagnostics = Vec::new();

    flag_where(df, &config.channel_column, &mut excluded, &mut diagnostics, |value| {
        value == config.excluded_channel
    });
    flag_where(
        df,
        &config.finished_column,
        &mut excluded,
        &mut diagnostics,
        is_false_flag,
    );
    flag_where(df, &config.terminate_column, &mut excluded, &mut diagnostics, |value| {
        config.terminating_flags.iter().any(|flag| flag == value)
    });
    (excluded, diagnostics)
}

/// Remove bad-quality respondents; runs before any value recoding.
pub fn remove_bad_quality(df: &DataFrame, config: &BadQualityConfig) -> Result<FilterOutcome> {
    let span = info_span!("bad_quality");
    let _guard = span.enter();
    let (excluded, diagnostics) = bad_quality_flags(df, config);
    let frame = retain_rows(df, &excluded)?;
    info!(
        rows_before = df.height(),
        rows_after = frame.height(),
        excluded = count_excluded(&excluded),
        "bad-quality filter applied"
    );
    Ok(FilterOutcome {
        rows_before: df.height(),
        rows_after: frame.height(),
        frame,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use polars::prelude::Column;

    use super::*;

    #[test]
    fn test_bad_quality_flags() {
        let df = DataFrame::new(vec![
            Column::new(
                "DistributionChannel".into(),
                vec!["anonymous", "preview", "anonymous", "anonymous", "anonymous"],
            ),
            Column::new("Finished".into(), vec!["True", "True", "False", "1", "True"]),
            Column::new(
                "Q_TerminateFlag".into(),
                vec![None, None, None, Some("QuotaMet"), Some("Other")],
            ),
        ])
        .unwrap();
        let (excluded, diagnostics) = bad_quality_flags(&df, &BadQualityConfig::default());
        assert_eq!(excluded, vec![false, true, true, true, false]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_absent_columns_flag_nobody() {
        let df = DataFrame::new(vec![Column::new("Finished".into(), vec!["0", "1"])]).unwrap();
        let outcome = remove_bad_quality(&df, &BadQualityConfig::default()).unwrap();
        assert_eq!(outcome.rows_after, 1);
        assert_eq!(outcome.diagnostics.len(), 2);
    }
}

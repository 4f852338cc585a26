//! Attention-check filter.

use polars::prelude::DataFrame;

use panel_common::column_strings;
use panel_model::{AttentionConfig, Diagnostic, DiagnosticKind};

/// Flag respondents whose attention-check answer is not exactly the expected one.
///
/// Missing answers fail the check. When the column is absent nobody is
/// flagged and a warning is returned.
pub fn attention_flags(df: &DataFrame, config: &AttentionConfig) -> (Vec<bool>, Vec<Diagnostic>) {
    match column_strings(df, &config.column) {
        Some(answers) => (
            answers
                .iter()
                .map(|answer| answer.as_deref() != Some(config.expected.as_str()))
                .collect(),
            Vec::new(),
        ),
        None => (
            vec![false; df.height()],
            vec![
                Diagnostic::warning(
                    DiagnosticKind::MissingColumn,
                    format!("column {} is not present, attention check skipped", config.column),
                )
                .with_column(&config.column),
            ],
        ),
    }
}

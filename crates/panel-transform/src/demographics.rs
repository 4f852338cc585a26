//! Demographics Normalizer.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use regex::Regex;
use tracing::{debug, warn};

use panel_common::{any_to_string_non_empty, format_numeric};
use panel_model::{
    DemographicsConfig, Diagnostic, DiagnosticKind, MappedValue, MappingTable, PanelError,
    Result, UnmappedPolicy, UnmappedValue,
};

#[derive(Debug, Clone)]
pub struct DemographicsOutcome {
    pub frame: DataFrame,
    /// Columns matched by the configured patterns.
    pub columns: Vec<String>,
    pub unmapped: Vec<UnmappedValue>,
    /// Unmapped-value warnings in strict mode, or a warning when nothing matched.
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile the column-name patterns; a malformed pattern is caller misuse.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| {
                PanelError::invalid_argument(format!("invalid column pattern '{pattern}': {e}"))
            })
        })
        .collect()
}

/// Anchored patterns matching each field bare or behind one of the wave prefixes.
pub fn field_patterns(fields: &[String], prefixes: &[&str]) -> Vec<String> {
    let prefix_group = prefixes
        .iter()
        .map(|prefix| format!("{}_", regex::escape(prefix)))
        .collect::<Vec<_>>()
        .join("|");
    fields
        .iter()
        .map(|field| {
            let field = regex::escape(field);
            if prefix_group.is_empty() {
                format!("^{field}$")
            } else {
                format!("^(?:{prefix_group})?{field}$")
            }
        })
        .collect()
}

/// Columns whose name matches any pattern, in frame order.
pub fn matching_columns(df: &DataFrame, patterns: &[Regex]) -> Vec<String> {
    df.get_column_names()
        .iter()
        .filter(|name| patterns.iter().any(|pattern| pattern.is_match(name.as_str())))
        .map(|name| name.to_string())
        .collect()
}

/// Trim and recode demographic columns through `table`.
///
/// Columns are the configured fields behind any of `prefixes`, plus the
/// extra patterns. Unmapped answers follow [`UnmappedPolicy`]; in strict
/// mode each distinct unmapped answer is also reported as a warning.
pub fn normalize_demographics(
    df: &DataFrame,
    table: &MappingTable,
    config: &DemographicsConfig,
    prefixes: &[&str],
) -> Result<DemographicsOutcome> {
    let mut sources = field_patterns(&config.fields, prefixes);
    sources.extend(config.patterns.iter().cloned());
    let patterns = compile_patterns(&sources)?;
    let columns = matching_columns(df, &patterns);

    let mut frame = df.clone();
    let mut unmapped = Vec::new();
    for name in &columns {
        let series = frame.column(name)?.as_materialized_series().clone();
        let mut column_unmapped: BTreeMap<String, usize> = BTreeMap::new();
        let mut values: Vec<Option<String>> = Vec::with_capacity(series.len());
        for idx in 0..series.len() {
            let Some(raw) = any_to_string_non_empty(series.get(idx).unwrap_or(AnyValue::Null))
            else {
                values.push(None);
                continue;
            };
            let trimmed = raw.trim();
            let value = match table.get(trimmed) {
                Some(MappedValue::Text(text)) => Some(text.clone()),
                Some(MappedValue::Number(number)) => Some(format_numeric(*number)),
                Some(MappedValue::Missing) => None,
                None => {
                    *column_unmapped.entry(trimmed.to_string()).or_default() += 1;
                    match config.unmapped {
                        UnmappedPolicy::Missing => None,
                        UnmappedPolicy::Keep => Some(trimmed.to_string()),
                    }
                }
            };
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

    let mut diagnostics: Vec<Diagnostic> = if config.strict {
        unmapped
            .iter()
            .map(|entry| {
                warn!(
                    column = %entry.column,
                    value = %entry.value,
                    count = entry.count,
                    "unmapped demographic value"
                );
                entry.to_diagnostic()
            })
            .collect()
    } else {
        Vec::new()
    };
    if columns.is_empty() && !patterns.is_empty() {
        warn!(prefixes = ?prefixes, "no demographic column matched");
        diagnostics.push(Diagnostic::warning(
            DiagnosticKind::MissingColumn,
            format!(
                "no demographic column matched fields [{}] with wave prefixes [{}]",
                config.fields.join(", "),
                prefixes.join(", ")
            ),
        ));
    }
    debug!(
        columns = columns.len(),
        unmapped_values = unmapped.len(),
        "normalized demographics"
    );
    Ok(DemographicsOutcome {
        frame,
        columns,
        unmapped,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use polars::prelude::Column;

    use panel_model::demographics_map;

    use super::*;

    #[test]
    fn test_default_patterns_match_prefixed_columns() {
        let df = DataFrame::new(vec![
            Column::new("S1_gender".into(), vec!["Male"]),
            Column::new("S2_age".into(), vec!["18 - 34"]),
            Column::new("S1_language_region".into(), vec!["x"]),
            Column::new("S1_gender_other".into(), vec!["x"]),
            Column::new("age".into(), vec!["x"]),
        ])
        .unwrap();
        let sources = field_patterns(&DemographicsConfig::default().fields, &["S1", "S2"]);
        let patterns = compile_patterns(&sources).unwrap();
        assert_eq!(
            matching_columns(&df, &patterns),
            vec!["S1_gender", "S2_age", "S1_language_region", "age"]
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let err = compile_patterns(&["(unclosed".to_string()]).unwrap_err();
        assert!(matches!(err, PanelError::InvalidArgument { .. }));
    }

    #[test]
    fn test_trailing_whitespace_uses_canonical_key() {
        let df = DataFrame::new(vec![Column::new(
            "S1_gender".into(),
            vec![Some("Female "), Some("Prefer not to say "), Some("Robot"), None],
        )])
        .unwrap();
        let outcome = normalize_demographics(
            &df,
            &demographics_map(),
            &DemographicsConfig::default(),
            &["S1", "S2"],
        )
        .unwrap();
        let gender = outcome.frame.column("S1_gender").unwrap();
        assert_eq!(gender.get(0).unwrap(), AnyValue::String("Female"));
        assert_eq!(gender.get(1).unwrap(), AnyValue::Null);
        assert_eq!(gender.get(2).unwrap(), AnyValue::Null);
        assert_eq!(outcome.unmapped.len(), 1);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(
            outcome.diagnostics[0].message,
            "unmapped value in column S1_gender: Robot"
        );
    }

    #[test]
    fn test_keep_policy_without_strict() {
        let df = DataFrame::new(vec![Column::new("S1_income".into(), vec![" Robot "])]).unwrap();
        let config = DemographicsConfig {
            strict: false,
            unmapped: UnmappedPolicy::Keep,
            ..DemographicsConfig::default()
        };
        let outcome = normalize_demographics(&df, &demographics_map(), &config, &["S1"]).unwrap();
        assert_eq!(
            outcome.frame.column("S1_income").unwrap().get(0).unwrap(),
            AnyValue::String("Robot")
        );
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.unmapped.len(), 1);
    }

    #[test]
    fn test_custom_wave_prefixes() {
        let df = DataFrame::new(vec![
            Column::new("W1_gender".into(), vec!["Female "]),
            Column::new("W2_gender".into(), vec!["Robot"]),
            Column::new("S1_gender".into(), vec!["Male"]),
        ])
        .unwrap();
        let outcome = normalize_demographics(
            &df,
            &demographics_map(),
            &DemographicsConfig::default(),
            &["W1", "W2"],
        )
        .unwrap();
        assert_eq!(outcome.columns, vec!["W1_gender", "W2_gender"]);
        assert_eq!(
            outcome.frame.column("W1_gender").unwrap().get(0).unwrap(),
            AnyValue::String("Female")
        );
        assert_eq!(
            outcome.frame.column("W2_gender").unwrap().get(0).unwrap(),
            AnyValue::Null
        );
        assert_eq!(
            outcome.frame.column("S1_gender").unwrap().get(0).unwrap(),
            AnyValue::String("Male")
        );
        assert_eq!(outcome.unmapped[0].column, "W2_gender");
    }

    #[test]
    fn test_no_matching_column_warns() {
        let df = DataFrame::new(vec![Column::new("T1_gender".into(), vec!["Male"])]).unwrap();
        let outcome = normalize_demographics(
            &df,
            &demographics_map(),
            &DemographicsConfig::default(),
            &["S1", "S2"],
        )
        .unwrap();
        assert!(outcome.columns.is_empty());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::MissingColumn);
    }

    #[test]
    fn test_field_patterns_escape_prefixes() {
        let patterns = field_patterns(&["age".to_string()], &["S.1"]);
        assert_eq!(patterns, vec![r"^(?:S\.1_)?age$"]);
        assert_eq!(field_patterns(&["age".to_string()], &[]), vec!["^age$"]);
    }
}

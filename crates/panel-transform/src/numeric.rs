//! Numeric coercion and numeric-token extraction.

use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use regex::Regex;
use tracing::{debug, warn};

use panel_common::any_to_f64;
use panel_model::{ColumnSelector, Diagnostic, DiagnosticKind, PanelError, Result};

/// First signed or decimal number embedded in a string.
const NUMERIC_TOKEN_PATTERN: &str = r"-?\d+\.?\d*";

/// Extracts the first number embedded in free text.
///
/// `"I agree, 4.5 out of 6"` yields `4.5`.
#[derive(Debug, Clone)]
pub struct NumericToken {
    pattern: Regex,
}

impl NumericToken {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(NUMERIC_TOKEN_PATTERN)
            .map_err(|e| PanelError::invalid_argument(e.to_string()))?;
        Ok(Self { pattern })
    }

    pub fn extract(&self, text: &str) -> Option<f64> {
        let token = self.pattern.find(text)?;
        token.as_str().parse::<f64>().ok()
    }
}

/// Result of coercing columns to numbers.
#[derive(Debug, Clone)]
pub struct CoercionOutcome {
    pub frame: DataFrame,
    /// Columns actually converted.
    pub columns: Vec<String>,
    /// Non-missing cells that could not be parsed and became missing.
    pub failed_cells: usize,
    /// Requested columns absent from the frame.
    pub diagnostics: Vec<Diagnostic>,
}

/// Convert every cell of a column to `f64`; unparsable cells become missing.
pub fn coerce_values(series: &Series) -> (Vec<Option<f64>>, usize) {
    let mut failed = 0usize;
    let mut values = Vec::with_capacity(series.len());
    for idx in 0..series.len() {
        let value = series.get(idx).unwrap_or(AnyValue::Null);
        let is_null = matches!(value, AnyValue::Null);
        let number = any_to_f64(value);
        if number.is_none() && !is_null {
            failed += 1;
        }
        values.push(number);
    }
    (values, failed)
}

/// Coerce the selected columns to `Float64`.
///
/// Requested columns that do not exist are skipped and reported with a
/// warning diagnostic; parse failures never raise.
pub fn coerce_numeric(df: &DataFrame, selector: &ColumnSelector) -> Result<CoercionOutcome> {
    let available = df.get_column_names_owned();
    let resolved = selector.resolve(&available);
    let diagnostics = missing_column_diagnostics(&resolved.missing, "numeric coercion");

    let mut frame = df.clone();
    let mut failed_cells = 0usize;
    for name in &resolved.present {
        let series = frame.column(name)?.as_materialized_series().clone();
        let (values, failed) = coerce_values(&series);
        failed_cells += failed;
        frame.with_column(Series::new(name.as_str().into(), values))?;
    }
    debug!(
        columns = resolved.present.len(),
        failed_cells, "coerced columns to numeric"
    );
    Ok(CoercionOutcome {
        frame,
        columns: resolved.present,
        failed_cells,
        diagnostics,
    })
}

/// One warning per requested-but-absent column.
pub(crate) fn missing_column_diagnostics(missing: &[String], stage: &str) -> Vec<Diagnostic> {
    missing
        .iter()
        .map(|column| {
            warn!(column = %column, stage, "requested column not present");
            Diagnostic::warning(
                DiagnosticKind::MissingColumn,
                format!("column {column} requested by {stage} is not present"),
            )
            .with_column(column.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, DataType};

    use super::*;

    #[test]
    fn test_extract_numeric_token() {
        let token = NumericToken::new().unwrap();
        assert_eq!(token.extract("I agree, 4.5 out of 6"), Some(4.5));
        assert_eq!(token.extract("-2 (disagree)"), Some(-2.0));
        assert_eq!(token.extract("3."), Some(3.0));
        assert_eq!(token.extract("Strongly agree"), None);
    }

    #[test]
    fn test_coerce_numeric_skips_missing_columns() {
        let df = DataFrame::new(vec![
            Column::new("id".into(), vec![Some("12"), Some("x"), None]),
            Column::new("note".into(), vec!["a", "b", "c"]),
        ])
        .unwrap();
        let outcome =
            coerce_numeric(&df, &ColumnSelector::named(["id", "number_household_1_TEXT"])).unwrap();
        let id = outcome.frame.column("id").unwrap();
        assert_eq!(id.dtype(), &DataType::Float64);
        assert_eq!(id.get(0).unwrap(), AnyValue::Float64(12.0));
        assert_eq!(id.get(1).unwrap(), AnyValue::Null);
        assert_eq!(outcome.failed_cells, 1);
        assert_eq!(outcome.columns, vec!["id"]);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(
            outcome.diagnostics[0].column.as_deref(),
            Some("number_household_1_TEXT")
        );
        assert_eq!(outcome.frame.column("note").unwrap().dtype(), &DataType::String);
    }
}

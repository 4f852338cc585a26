//! IRR Calculator for the repeated choice task.
//!
//! The first and last choice tasks are identical with the options swapped,
//! so a respondent whose two answers differ answered consistently in
//! substance. IRR is the share of such respondents.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use panel_common::column_cell_keys;
use panel_model::{Diagnostic, DiagnosticKind, PanelError, Result};

/// 97.5th percentile of the standard normal distribution.
pub const Z_975: f64 = 1.959964;

/// What to do when the swap-error radicand is negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapErrorPolicy {
    /// Report NaN.
    #[default]
    Undefined,
    /// Clip the radicand at zero.
    Clip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrColumns {
    pub first: String,
    pub last: String,
    pub respondent: String,
}

impl Default for IrrColumns {
    fn default() -> Self {
        Self {
            first: "choice_first".to_string(),
            last: "choice_last".to_string(),
            respondent: "respondent_id".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrrEstimate {
    /// Respondents whose first and last answers differ.
    pub inconsistent_count: usize,
    /// Respondents whose first and last answers are identical.
    pub consistent_count: usize,
    /// Distinct respondents behind the pairs.
    pub respondents: usize,
    pub irr: f64,
    pub standard_error: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// `1 - 2 (1 - IRR)`; negative when IRR < 0.5.
    pub swap_radicand: f64,
    pub swap_error: f64,
}

impl IrrEstimate {
    pub fn pairs(&self) -> usize {
        self.inconsistent_count + self.consistent_count
    }

    pub fn is_degenerate(&self) -> bool {
        self.swap_radicand < 0.0
    }
}

/// Swap-error estimate `(1 - sqrt(1 - 2 (1 - irr))) / 2`.
pub fn swap_error(irr: f64, policy: SwapErrorPolicy) -> f64 {
    let radicand = 1.0 - 2.0 * (1.0 - irr);
    let radicand = match policy {
        SwapErrorPolicy::Undefined => radicand,
        SwapErrorPolicy::Clip => radicand.max(0.0),
    };
    // sqrt of a negative number is NaN
    (1.0 - radicand.sqrt()) / 2.0
}

/// Derive the estimate from pair counts.
pub fn irr_from_counts(
    inconsistent_count: usize,
    consistent_count: usize,
    respondents: usize,
    policy: SwapErrorPolicy,
) -> Result<IrrEstimate> {
    let pairs = inconsistent_count + consistent_count;
    if pairs == 0 || respondents == 0 {
        return Err(PanelError::EmptyInput {
            what: "IRR calculation".to_string(),
        });
    }
    let irr = inconsistent_count as f64 / pairs as f64;
    let standard_error = (irr * (1.0 - irr) / respondents as f64).sqrt();
    Ok(IrrEstimate {
        inconsistent_count,
        consistent_count,
        respondents,
        irr,
        standard_error,
        ci_lower: irr - Z_975 * standard_error,
        ci_upper: irr + Z_975 * standard_error,
        swap_radicand: 1.0 - 2.0 * (1.0 - irr),
        swap_error: swap_error(irr, policy),
    })
}

#[derive(Debug, Clone)]
pub struct IrrOutcome {
    pub estimate: IrrEstimate,
    /// Rows skipped because an answer was missing.
    pub skipped_rows: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compute IRR over a table with one row per respondent.
///
/// Answers compare by value. Rows missing either answer are skipped.
pub fn calculate_irr(
    df: &DataFrame,
    columns: &IrrColumns,
    policy: SwapErrorPolicy,
) -> Result<IrrOutcome> {
    let required = |name: &str| {
        column_cell_keys(df, name).ok_or_else(|| PanelError::MissingColumn {
            column: name.to_string(),
        })
    };
    let first = required(&columns.first)?;
    let last = required(&columns.last)?;
    let respondent = required(&columns.respondent)?;

    let mut inconsistent = 0usize;
    let mut consistent = 0usize;
    let mut skipped_rows = 0usize;
    let mut respondents = BTreeSet::new();
    for ((first, last), respondent) in first.iter().zip(&last).zip(&respondent) {
        let (Some(first), Some(last)) = (first, last) else {
            skipped_rows += 1;
            continue;
        };
        if first == last {
            consistent += 1;
        } else {
            inconsistent += 1;
        }
        if let Some(respondent) = respondent {
            respondents.insert(respondent.as_str());
        }
    }

    let estimate = irr_from_counts(inconsistent, consistent, respondents.len(), policy)?;
    let mut diagnostics = Vec::new();
    if estimate.is_degenerate() {
        warn!(
            irr = estimate.irr,
            radicand = estimate.swap_radicand,
            "swap error undefined for IRR below 0.5"
        );
        diagnostics.push(Diagnostic::warning(
            DiagnosticKind::DegenerateSwapError,
            format!(
                "IRR {:.4} gives a negative swap-error radicand {:.4}",
                estimate.irr, estimate.swap_radicand
            ),
        ));
    }
    info!(
        pairs = estimate.pairs(),
        respondents = estimate.respondents,
        irr = estimate.irr,
        ci_lower = estimate.ci_lower,
        ci_upper = estimate.ci_upper,
        swap_error = estimate.swap_error,
        "computed IRR"
    );
    Ok(IrrOutcome {
        estimate,
        skipped_rows,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_of_four_inconsistent() {
        let estimate = irr_from_counts(3, 1, 4, SwapErrorPolicy::Undefined).unwrap();
        assert!((estimate.irr - 0.75).abs() < 1e-12);
        let half_width = Z_975 * (0.75f64 * 0.25 / 4.0).sqrt();
        assert!((estimate.ci_upper - 0.75 - half_width).abs() < 1e-12);
        assert!((0.75 - estimate.ci_lower - half_width).abs() < 1e-12);
        assert!((estimate.swap_error - (1.0 - 0.5f64.sqrt()) / 2.0).abs() < 1e-12);
        assert!(!estimate.is_degenerate());
    }

    #[test]
    fn test_low_irr_is_degenerate() {
        let estimate = irr_from_counts(1, 9, 10, SwapErrorPolicy::Undefined).unwrap();
        assert!(estimate.is_degenerate());
        assert!(estimate.swap_error.is_nan());

        let clipped = irr_from_counts(1, 9, 10, SwapErrorPolicy::Clip).unwrap();
        assert!(clipped.is_degenerate());
        assert!((clipped.swap_error - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_pairs() {
        let err = irr_from_counts(0, 0, 0, SwapErrorPolicy::Undefined).unwrap_err();
        assert!(matches!(err, PanelError::EmptyInput { .. }));
    }
}

//! Speed filter: duration outliers at both ends.

use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use tracing::{debug, warn};

use panel_common::any_to_f64;
use panel_model::{Diagnostic, DiagnosticKind, Result, SpeedConfig};

/// Speed flags computed on one wave snapshot.
#[derive(Debug, Clone)]
pub struct SpeedFlags {
    /// The snapshot with the duration column renamed and numeric.
    pub frame: DataFrame,
    pub excluded: Vec<bool>,
    /// Lower and upper duration bounds, when computed.
    pub bounds: Option<(f64, f64)>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Linear-interpolation quantile of sorted values (`q` in `[0, 1]`).
pub fn linear_quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Flag respondents at or below the lower quantile or at or above the upper
/// quantile of the duration column.
///
/// The source column is renamed to the canonical name first. When it is
/// absent (already renamed by an earlier run) the filter is skipped with a
/// diagnostic and nobody is flagged. Missing durations are always flagged.
pub fn speed_flags(df: &DataFrame, config: &SpeedConfig) -> Result<SpeedFlags> {
    let Ok(source) = df.column(&config.source_column) else {
        warn!(
            column = %config.source_column,
            "duration column already renamed, speed filter skipped"
        );
        return Ok(SpeedFlags {
            frame: df.clone(),
            excluded: vec![false; df.height()],
            bounds: None,
            diagnostics: vec![
                Diagnostic::warning(
                    DiagnosticKind::SpeedFilterSkipped,
                    format!(
                        "column {} not found, speed filter already applied",
                        config.source_column
                    ),
                )
                .with_column(&config.source_column),
            ],
        });
    };

    let durations: Vec<Option<f64>> = (0..source.len())
        .map(|idx| any_to_f64(source.get(idx).unwrap_or(AnyValue::Null)))
        .collect();
    let mut frame = df.drop(&config.source_column)?;
    if frame.column(&config.canonical_column).is_ok() {
        frame = frame.drop(&config.canonical_column)?;
    }
    frame.with_column(Series::new(
        config.canonical_column.as_str().into(),
        durations.clone(),
    ))?;
    let order: Vec<String> = df
        .get_column_names()
        .iter()
        .filter(|name| name.as_str() != config.canonical_column)
        .map(|name| {
            if name.as_str() == config.source_column {
                config.canonical_column.clone()
            } else {
                name.to_string()
            }
        })
        .collect();
    let frame = frame.select(order)?;

    let mut sorted: Vec<f64> = durations.iter().flatten().copied().collect();
    sorted.sort_by(f64::total_cmp);
    let bounds = linear_quantile(&sorted, config.lower_quantile)
        .zip(linear_quantile(&sorted, config.upper_quantile));
    let excluded: Vec<bool> = durations
        .iter()
        .map(|duration| match (duration, bounds) {
            (Some(value), Some((lower, upper))) => *value <= lower || *value >= upper,
            _ => true,
        })
        .collect();
    if let Some((lower, upper)) = bounds {
        debug!(
            min = sorted.first().copied(),
            max = sorted.last().copied(),
            lower,
            upper,
            "duration bounds"
        );
    }
    Ok(SpeedFlags {
        frame,
        excluded,
        bounds,
        diagnostics: Vec::new(),
    })
}

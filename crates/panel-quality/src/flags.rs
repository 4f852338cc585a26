//! Snapshot quality flags: speed, straightlining and attention.

use polars::prelude::DataFrame;
use tracing::{info, info_span};

use panel_model::{Diagnostic, PipelineConfig, Result};

use crate::attention::attention_flags;
use crate::mask::{any_excluded, count_excluded, retain_rows};
use crate::speed::speed_flags;
use crate::straightline::{GroupCount, straightline_flags};

/// The three flags, all computed on the same input snapshot.
#[derive(Debug, Clone)]
pub struct QualityFlags {
    pub speed: Vec<bool>,
    pub straightline: Vec<bool>,
    pub attention: Vec<bool>,
    pub speed_bounds: Option<(f64, f64)>,
    pub groups: Vec<GroupCount>,
}

impl QualityFlags {
    /// A respondent is excluded when any flag is set.
    pub fn excluded(&self) -> Vec<bool> {
        any_excluded(
            &[
                self.speed.as_slice(),
                self.straightline.as_slice(),
                self.attention.as_slice(),
            ],
            self.speed.len(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct QualityOutcome {
    pub frame: DataFrame,
    pub flags: QualityFlags,
    pub rows_before: usize,
    pub rows_after: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compute all snapshot flags on `df` and drop flagged respondents once.
///
/// The returned frame carries the canonical duration column.
pub fn apply_quality_flags(df: &DataFrame, config: &PipelineConfig) -> Result<QualityOutcome> {
    let span = info_span!("quality_flags");
    let _guard = span.enter();

    let speed = speed_flags(df, &config.speed)?;
    let straightline = straightline_flags(df, &config.straightline_groups);
    let (attention, attention_diagnostics) = attention_flags(df, &config.attention);

    let mut diagnostics = speed.diagnostics;
    diagnostics.extend(attention_diagnostics);
    let flags = QualityFlags {
        speed: speed.excluded,
        straightline: straightline.excluded,
        attention,
        speed_bounds: speed.bounds,
        groups: straightline.groups,
    };
    let excluded = flags.excluded();
    let frame = retain_rows(&speed.frame, &excluded)?;
    info!(
        rows_before = df.height(),
        rows_after = frame.height(),
        speeders = count_excluded(&flags.speed),
        straightliners = count_excluded(&flags.straightline),
        inattentive = count_excluded(&flags.attention),
        "quality flags applied"
    );
    Ok(QualityOutcome {
        rows_before: df.height(),
        rows_after: frame.height(),
        frame,
        flags,
        diagnostics,
    })
}

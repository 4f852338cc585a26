//! Respondent quality filters for one survey wave.
//!
//! - **bad_quality**: preview, unfinished and terminated submissions
//! - **speed**, **straightline**, **attention**: snapshot flags combined in [`flags`]
//! - **duplicate_ip**: respondents on addresses shared by too many identities

use polars::prelude::DataFrame;

use panel_model::Diagnostic;

pub mod attention;
pub mod bad_quality;
pub mod duplicate_ip;
pub mod flags;
pub mod mask;
pub mod speed;
pub mod straightline;

pub use attention::attention_flags;
pub use bad_quality::{bad_quality_flags, remove_bad_quality};
pub use duplicate_ip::{DuplicateIpOutcome, SharedIp, resolve_duplicate_ips, shared_ips};
pub use flags::{QualityFlags, QualityOutcome, apply_quality_flags};
pub use mask::{any_excluded, count_excluded, retain_rows};
pub use speed::{SpeedFlags, linear_quantile, speed_flags};
pub use straightline::{GroupCount, StraightlineFlags, group_columns, straightline_flags};

/// Frame left after a row filter, with counts for diagnostics.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub frame: DataFrame,
    pub rows_before: usize,
    pub rows_after: usize,
    pub diagnostics: Vec<Diagnostic>,
}

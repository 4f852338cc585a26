//! Panel-level processing: merging the waves, IRR statistics, sample
//! description and the staged pipeline that ties the crates together.

pub mod describe;
pub mod irr;
pub mod merge;
pub mod pipeline;

pub use describe::{CategoryShare, ExpectedCount, MarginTable, distribution, population_margins};
pub use irr::{
    IrrColumns, IrrEstimate, IrrOutcome, SwapErrorPolicy, Z_975, calculate_irr, irr_from_counts,
    swap_error,
};
pub use merge::{MergeOutcome, check_merge_inputs, merge_waves};
pub use pipeline::{
    PanelReport, PreparedPanel, PreparedWave, StageCount, WaveReport, anonymize, prepare_panel,
    prepare_wave,
};

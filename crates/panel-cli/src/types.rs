use std::path::PathBuf;

use panel_core::{CategoryShare, IrrOutcome, MarginTable, PanelReport};

/// Inputs of the `prepare` command.
#[derive(Debug, Clone)]
pub struct PrepareRequest {
    pub first_wave: PathBuf,
    pub second_wave: PathBuf,
    pub crosswalk: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub keep_identifiers: bool,
    pub dry_run: bool,
}

/// Observed distribution of one demographic column.
#[derive(Debug, Clone)]
pub struct ColumnDistribution {
    pub column: String,
    pub shares: Vec<CategoryShare>,
}

#[derive(Debug, Clone)]
pub struct PrepareResult {
    pub report: PanelReport,
    /// Written output file; `None` on a dry run.
    pub output: Option<PathBuf>,
    pub rows: usize,
    pub columns: usize,
    pub distributions: Vec<ColumnDistribution>,
    pub margins: Vec<MarginTable>,
}

impl PrepareResult {
    pub fn warning_count(&self) -> usize {
        self.report.warning_count()
    }
}

/// Inputs of the `irr` command.
#[derive(Debug, Clone)]
pub struct IrrRequest {
    pub input: PathBuf,
    pub first: String,
    pub last: String,
    pub respondent: String,
    pub metadata_rows: usize,
    pub clip: bool,
}

#[derive(Debug, Clone)]
pub struct IrrResult {
    pub input: PathBuf,
    pub rows: usize,
    pub outcome: IrrOutcome,
}

//! Staged preparation of the two waves and the merged panel.
//!
//! Each wave runs through these stages in order:
//! 1. **Bad quality**: preview, unfinished and terminated submissions
//! 2. **Likert**: anchor labels to numbers, numeric free-text columns
//! 3. **Quality flags**: speed, straightlining and attention on one snapshot
//! 4. **Duplicate IP**: respondents on shared addresses
//! 5. **Prefix**: every column gets `<wave>_`
//!
//! The panel then merges both waves through the crosswalk, normalizes the
//! demographic columns and applies the configured recodes. Every stage
//! returns a new frame; nothing is filtered against stale state.

use std::fmt;
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{debug, info, info_span, warn};

use panel_common::parse_f64;

use panel_model::{
    ColumnSelector, Diagnostic, DiagnosticKind, MappingTable, PipelineConfig, RecodeStep, Result,
    Severity,
    UnmappedValue, WaveConfig, builtin_table, count_severity, demographics_map, likert_map,
};
use panel_quality::{
    apply_quality_flags, count_excluded, remove_bad_quality, resolve_duplicate_ips,
};
use panel_transform::{
    MapOptions, add_prefix, coerce_numeric, drop_anonymized, map_values, normalize_demographics,
    rename_substrings, transform_likert,
};

use crate::merge::merge_waves;

/// Row counts around one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCount {
    pub stage: &'static str,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl StageCount {
    fn new(stage: &'static str, rows_before: usize, rows_after: usize) -> Self {
        Self {
            stage,
            rows_before,
            rows_after,
        }
    }

    pub fn removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

#[derive(Debug, Clone)]
pub struct WaveReport {
    pub wave: String,
    pub stages: Vec<StageCount>,
    pub speeders: usize,
    pub straightliners: usize,
    pub inattentive: usize,
    pub shared_ips: usize,
    pub speed_bounds: Option<(f64, f64)>,
    pub diagnostics: Vec<Diagnostic>,
}

impl WaveReport {
    pub fn input_rows(&self) -> usize {
        self.stages.first().map_or(0, |stage| stage.rows_before)
    }

    pub fn output_rows(&self) -> usize {
        self.stages.last().map_or(0, |stage| stage.rows_after)
    }
}

impl fmt::Display for WaveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wave {}: {} -> {} rows",
            self.wave,
            self.input_rows(),
            self.output_rows()
        )?;
        for stage in &self.stages {
            write!(
                f,
                "\n  {}: {} -> {} (-{})",
                stage.stage,
                stage.rows_before,
                stage.rows_after,
                stage.removed()
            )?;
        }
        write!(
            f,
            "\n  flagged: {} speeders, {} straightliners, {} inattentive, {} shared IPs",
            self.speeders, self.straightliners, self.inattentive, self.shared_ips
        )
    }
}

#[derive(Debug, Clone)]
pub struct PreparedWave {
    pub frame: DataFrame,
    pub report: WaveReport,
}

fn shadowed_key_diagnostics(table: &MappingTable) -> Vec<Diagnostic> {
    table
        .shadowed()
        .iter()
        .map(|shadowed| {
            Diagnostic::info(
                DiagnosticKind::ShadowedMappingKey,
                format!(
                    "key '{}' of table {} redefined, the later entry wins",
                    shadowed.key,
                    table.name()
                ),
            )
            .with_value(&shadowed.key)
        })
        .collect()
}

/// Run one raw wave export through the wave stages.
pub fn prepare_wave(
    raw: &DataFrame,
    wave: &WaveConfig,
    config: &PipelineConfig,
) -> Result<PreparedWave> {
    let span = info_span!("wave", wave = %wave.name);
    let _guard = span.enter();
    let started = Instant::now();
    let mut stages = Vec::with_capacity(5);
    let mut diagnostics = Vec::new();

    let renamed = rename_substrings(raw, &config.column_renames)?;

    let bad_quality = remove_bad_quality(&renamed, &config.bad_quality)?;
    stages.push(StageCount::new(
        "bad_quality",
        bad_quality.rows_before,
        bad_quality.rows_after,
    ));
    diagnostics.extend(bad_quality.diagnostics);

    let recoded = {
        let span = info_span!("likert");
        let _guard = span.enter();
        let table = likert_map();
        diagnostics.extend(shadowed_key_diagnostics(&table));
        let likert = transform_likert(&bad_quality.frame, &table, &config.likert_columns)?;
        diagnostics.extend(likert.diagnostics);
        let numeric = coerce_numeric(
            &likert.frame,
            &ColumnSelector::Named(config.numeric_columns.clone()),
        )?;
        diagnostics.extend(numeric.diagnostics);
        info!(
            likert_columns = likert.columns.len(),
            discarded_cells = likert.discarded_cells,
            numeric_columns = numeric.columns.len(),
            failed_cells = numeric.failed_cells,
            "likert transform applied"
        );
        numeric.frame
    };
    stages.push(StageCount::new("likert", recoded.height(), recoded.height()));

    let quality = apply_quality_flags(&recoded, config)?;
    stages.push(StageCount::new(
        "quality_flags",
        quality.rows_before,
        quality.rows_after,
    ));
    diagnostics.extend(quality.diagnostics);
    let flags = &quality.flags;
    let (speeders, straightliners, inattentive) = (
        count_excluded(&flags.speed),
        count_excluded(&flags.straightline),
        count_excluded(&flags.attention),
    );

    let duplicate_ip = resolve_duplicate_ips(&quality.frame, &config.duplicate_ip)?;
    stages.push(StageCount::new(
        "duplicate_ip",
        duplicate_ip.rows_before,
        duplicate_ip.rows_after,
    ));
    diagnostics.extend(duplicate_ip.diagnostics);

    let frame = {
        let span = info_span!("prefix");
        let _guard = span.enter();
        let prefixed = add_prefix(&duplicate_ip.frame, &wave.name)?;
        debug!(columns = prefixed.width(), "prefixed wave columns");
        prefixed
    };
    stages.push(StageCount::new("prefix", frame.height(), frame.height()));

    let report = WaveReport {
        wave: wave.name.clone(),
        stages,
        speeders,
        straightliners,
        inattentive,
        shared_ips: duplicate_ip.shared.len(),
        speed_bounds: flags.speed_bounds,
        diagnostics,
    };
    info!(
        input_rows = report.input_rows(),
        output_rows = report.output_rows(),
        warnings = count_severity(&report.diagnostics, Severity::Warning),
        duration_ms = started.elapsed().as_millis(),
        "wave prepared"
    );
    Ok(PreparedWave { frame, report })
}

#[derive(Debug, Clone)]
pub struct PanelReport {
    pub waves: Vec<WaveReport>,
    pub crosswalk_rows: usize,
    pub merged_rows: usize,
    pub demographic_columns: Vec<String>,
    pub unmapped: Vec<UnmappedValue>,
    /// Merge, demographics and recode diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl PanelReport {
    /// Every diagnostic of the run, waves first.
    pub fn all_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.waves
            .iter()
            .flat_map(|wave| wave.diagnostics.iter())
            .chain(self.diagnostics.iter())
    }

    pub fn warning_count(&self) -> usize {
        self.all_diagnostics()
            .filter(|diagnostic| diagnostic.severity == Severity::Warning)
            .count()
    }
}

impl fmt::Display for PanelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for wave in &self.waves {
            writeln!(f, "{wave}")?;
        }
        write!(
            f,
            "merged: {} crosswalk rows -> {} respondents\ndemographics: {} columns, {} unmapped values\nwarnings: {}",
            self.crosswalk_rows,
            self.merged_rows,
            self.demographic_columns.len(),
            self.unmapped.len(),
            self.warning_count()
        )
    }
}

#[derive(Debug, Clone)]
pub struct PreparedPanel {
    pub frame: DataFrame,
    pub report: PanelReport,
}

impl PreparedPanel {
    /// The merged frame without identifying columns, ready to be written.
    pub fn anonymized(&self, config: &PipelineConfig) -> Result<DataFrame> {
        anonymize(&self.frame, config)
    }
}

/// Drop the configured identifying columns, bare or wave-prefixed.
pub fn anonymize(frame: &DataFrame, config: &PipelineConfig) -> Result<DataFrame> {
    drop_anonymized(frame, &config.anonymize_columns, &config.wave_names())
}

/// Whether an unmapped cell of a recode step is worth a warning.
///
/// Named steps report every unmapped value. Steps over all columns only
/// report values a numeric step could not parse, since those became missing.
fn recode_reports(step: &RecodeStep, entry: &UnmappedValue) -> bool {
    matches!(step.columns, ColumnSelector::Named(_))
        || (step.numeric && parse_f64(&entry.value).is_none())
}

/// Prepare both waves, merge them and normalize the merged table.
pub fn prepare_panel(
    first_raw: &DataFrame,
    second_raw: &DataFrame,
    crosswalk: &DataFrame,
    config: &PipelineConfig,
) -> Result<PreparedPanel> {
    config.validate()?;
    let started = Instant::now();
    let first = prepare_wave(first_raw, config.first_wave(), config)?;
    let second = prepare_wave(second_raw, config.second_wave(), config)?;

    let merged = merge_waves(crosswalk, &first.frame, &second.frame, config)?;
    let mut diagnostics = merged.diagnostics;

    let table = demographics_map();
    diagnostics.extend(shadowed_key_diagnostics(&table));
    let demographics = normalize_demographics(
        &merged.frame,
        &table,
        &config.demographics,
        &config.wave_names(),
    )?;
    diagnostics.extend(demographics.diagnostics);

    let mut frame = demographics.frame;
    for step in &config.recodes {
        let table = builtin_table(&step.table)?;
        diagnostics.extend(shadowed_key_diagnostics(&table));
        let recoded = map_values(
            &frame,
            &table,
            &step.columns,
            MapOptions {
                numeric: step.numeric,
            },
        )?;
        debug!(
            table = %step.table,
            columns = recoded.columns.len(),
            mapped_cells = recoded.mapped_cells,
            "applied recode"
        );
        diagnostics.extend(recoded.diagnostics);
        for entry in &recoded.unmapped {
            if !recode_reports(step, entry) {
                continue;
            }
            warn!(
                table = %step.table,
                column = %entry.column,
                value = %entry.value,
                count = entry.count,
                "unmapped recode value"
            );
            diagnostics.push(entry.to_diagnostic());
        }
        frame = recoded.frame;
    }

    let report = PanelReport {
        waves: vec![first.report, second.report],
        crosswalk_rows: merged.crosswalk_rows,
        merged_rows: frame.height(),
        demographic_columns: demographics.columns,
        unmapped: demographics.unmapped,
        diagnostics,
    };
    info!(
        merged_rows = report.merged_rows,
        warnings = report.warning_count(),
        duration_ms = started.elapsed().as_millis(),
        "panel prepared"
    );
    Ok(PreparedPanel { frame, report })
}

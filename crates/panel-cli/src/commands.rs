use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use panel_core::{
    IrrColumns, SwapErrorPolicy, calculate_irr, distribution, population_margins, prepare_panel,
};
use panel_ingest::{WaveReadOptions, read_crosswalk, read_wave_csv, read_wave_csv_with_options, write_csv};
use panel_model::PipelineConfig;

use crate::types::{ColumnDistribution, IrrRequest, IrrResult, PrepareRequest, PrepareResult};

/// Load the TOML configuration, or the built-in defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

pub fn run_prepare(request: &PrepareRequest) -> Result<PrepareResult> {
    let span = info_span!("prepare", output = %request.output.display());
    let _guard = span.enter();
    let started = Instant::now();
    let config = load_config(request.config.as_deref())?;

    let first = read_wave_csv(&request.first_wave)
        .with_context(|| format!("read wave 1 export {}", request.first_wave.display()))?;
    let second = read_wave_csv(&request.second_wave)
        .with_context(|| format!("read wave 2 export {}", request.second_wave.display()))?;
    let crosswalk = read_crosswalk(&request.crosswalk, &config.crosswalk)
        .with_context(|| format!("read crosswalk {}", request.crosswalk.display()))?;

    let panel = prepare_panel(&first, &second, &crosswalk, &config).context("prepare panel")?;
    let frame = if request.keep_identifiers {
        panel.frame.clone()
    } else {
        panel.anonymized(&config).context("drop identifying columns")?
    };

    let output = if request.dry_run {
        None
    } else {
        write_csv(&frame, &request.output)
            .with_context(|| format!("write {}", request.output.display()))?;
        Some(request.output.clone())
    };

    let resolved_margins = config.resolved_margins();
    let mut distributions = Vec::new();
    for margin in &resolved_margins {
        if frame.column(&margin.column).is_err() {
            continue;
        }
        let shares = distribution(&frame, &margin.column)
            .with_context(|| format!("describe {}", margin.column))?;
        distributions.push(ColumnDistribution {
            column: margin.column.clone(),
            shares,
        });
    }
    let margins = population_margins(&resolved_margins, frame.height());

    info!(
        rows = frame.height(),
        columns = frame.width(),
        written = output.is_some(),
        duration_ms = started.elapsed().as_millis(),
        "prepare complete"
    );
    Ok(PrepareResult {
        report: panel.report,
        output,
        rows: frame.height(),
        columns: frame.width(),
        distributions,
        margins,
    })
}

pub fn run_irr(request: &IrrRequest) -> Result<IrrResult> {
    let span = info_span!("irr", input = %request.input.display());
    let _guard = span.enter();
    let options = WaveReadOptions {
        metadata_rows: request.metadata_rows,
        ..WaveReadOptions::default()
    };
    let frame = read_wave_csv_with_options(&request.input, options)
        .with_context(|| format!("read {}", request.input.display()))?;
    let columns = IrrColumns {
        first: request.first.clone(),
        last: request.last.clone(),
        respondent: request.respondent.clone(),
    };
    let policy = if request.clip {
        SwapErrorPolicy::Clip
    } else {
        SwapErrorPolicy::Undefined
    };
    let outcome = calculate_irr(&frame, &columns, policy).context("compute IRR")?;
    Ok(IrrResult {
        input: request.input.clone(),
        rows: frame.height(),
        outcome,
    })
}

//! Panel survey cleaning CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use panel_cli::commands::{run_irr, run_prepare};
use panel_cli::logging::{LogConfig, LogFormat, init_logging};
use panel_cli::types::{IrrRequest, PrepareRequest};

mod cli;
mod summary;

use crate::cli::{Cli, Command, IrrArgs, LogFormatArg, LogLevelArg, PrepareArgs};
use crate::summary::{print_irr_summary, print_prepare_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Prepare(args) => match run_prepare(&prepare_request(args)) {
            Ok(result) => {
                print_prepare_summary(&result);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Irr(args) => match run_irr(&irr_request(args)) {
            Ok(result) => {
                if args.json {
                    match serde_json::to_string_pretty(&result.outcome.estimate) {
                        Ok(json) => println!("{json}"),
                        Err(error) => eprintln!("error: {error}"),
                    }
                } else {
                    print_irr_summary(&result);
                }
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn prepare_request(args: &PrepareArgs) -> PrepareRequest {
    PrepareRequest {
        first_wave: args.first_wave.clone(),
        second_wave: args.second_wave.clone(),
        crosswalk: args.crosswalk.clone(),
        output: args.output.clone(),
        config: args.config.clone(),
        keep_identifiers: args.keep_identifiers,
        dry_run: args.dry_run,
    }
}

fn irr_request(args: &IrrArgs) -> IrrRequest {
    IrrRequest {
        input: args.input.clone(),
        first: args.first.clone(),
        last: args.last.clone(),
        respondent: args.respondent.clone(),
        metadata_rows: args.metadata_rows,
        clip: args.clip,
    }
}

/// Build logging configuration from CLI flags; `--log-level` beats `-v/-q`,
/// and either beats `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

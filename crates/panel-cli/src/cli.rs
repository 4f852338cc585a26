//! CLI argument definitions for the panel survey pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "panel-survey",
    version,
    about = "Clean and merge a two-wave panel survey",
    long_about = "Clean and merge the raw exports of a two-wave panel survey.\n\n\
                  Removes preview, speeding, straightlining, inattentive and\n\
                  shared-IP respondents, recodes Likert and demographic answers\n\
                  and links both waves through an ID crosswalk."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow respondent-level values (IP addresses, identifiers) in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Clean both waves, merge them and write the analysis table.
    Prepare(PrepareArgs),

    /// Compute inter-rater reliability of the repeated choice task.
    Irr(IrrArgs),
}

#[derive(Parser)]
pub struct PrepareArgs {
    /// Wave 1 export (comma-delimited, two metadata rows after the header).
    #[arg(value_name = "WAVE1")]
    pub first_wave: PathBuf,

    /// Wave 2 export.
    #[arg(value_name = "WAVE2")]
    pub second_wave: PathBuf,

    /// Semicolon-delimited ID crosswalk.
    #[arg(value_name = "CROSSWALK")]
    pub crosswalk: PathBuf,

    /// Output CSV path.
    #[arg(short = 'o', long = "output", value_name = "PATH", default_value = "panel_clean.csv")]
    pub output: PathBuf,

    /// Pipeline configuration (TOML). Built-in study defaults when omitted.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Keep identifying columns (IP address, location, ids) in the output.
    #[arg(long = "keep-identifiers")]
    pub keep_identifiers: bool,

    /// Run every stage and report without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct IrrArgs {
    /// Merged panel CSV with one row per respondent.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Column holding the first choice-task answer.
    #[arg(long = "first", default_value = "choice_first")]
    pub first: String,

    /// Column holding the repeated (last) choice-task answer.
    #[arg(long = "last", default_value = "choice_last")]
    pub last: String,

    /// Respondent identifier column.
    #[arg(long = "respondent", default_value = "respondent_id")]
    pub respondent: String,

    /// Metadata rows between the header and the data.
    #[arg(long = "metadata-rows", default_value_t = 0)]
    pub metadata_rows: usize,

    /// Clip a negative swap-error radicand at zero instead of reporting NaN.
    #[arg(long = "clip")]
    pub clip: bool,

    /// Print the estimate as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

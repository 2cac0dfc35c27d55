//! CLI argument definitions for the rowbind decoder.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "rowbind",
    version,
    about = "Decode CSV rows into typed records",
    long_about = "Decode CSV rows into typed records.\n\n\
                  Columns are matched by header name or by position and coerced\n\
                  into integers, strings, booleans and timestamps."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode every row of a CSV file into student records.
    Decode(DecodeArgs),

    /// Print the schema of the student record.
    Schema,
}

#[derive(Debug, Clone, Parser)]
pub struct DecodeArgs {
    /// CSV file to decode.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// JSON file with decoder and CSV settings; flags below override it.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Treat the first row as data and match columns by position.
    #[arg(long = "no-header")]
    pub no_header: bool,

    /// strftime layout for timestamp columns.
    #[arg(long = "time-layout", value_name = "LAYOUT")]
    pub time_layout: Option<String>,

    /// Raw value read as boolean true (repeatable, replaces the defaults).
    #[arg(long = "true-literal", value_name = "VALUE")]
    pub true_literals: Vec<String>,

    /// Raw value read as null on optional fields (repeatable, replaces the defaults).
    #[arg(long = "null-literal", value_name = "VALUE")]
    pub null_literals: Vec<String>,

    /// Field delimiter (a single ASCII character).
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Accept rows whose field count differs from the first row.
    #[arg(long = "flexible")]
    pub flexible: bool,

    /// Output format for decoded records.
    #[arg(long = "format", value_enum, default_value = "json")]
    pub format: OutputFormatArg,

    /// Stop at the first row that fails to decode.
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,
}

impl DecodeArgs {
    /// Arguments for decoding `file` with every option left at its default.
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            config: None,
            no_header: false,
            time_layout: None,
            true_literals: Vec::new(),
            null_literals: Vec::new(),
            delimiter: None,
            flexible: false,
            format: OutputFormatArg::Json,
            fail_fast: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// One JSON object per line.
    Json,
    /// A table rendered after the last row.
    Table,
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

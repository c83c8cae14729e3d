//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use ehr_cli::pipeline::ProblemKind;

#[derive(Parser)]
#[command(
    name = "ehr",
    version,
    about = "Build entity graphs from EHR exports and compute prediction cutoff times",
    long_about = "Build entity graphs from flat EHR record exports and compute the\n\
                  cutoff-time table of a prediction problem.\n\n\
                  Each CSV file in the input folder is matched to a record type by name."
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
    /// List the registered record types and their relationships.
    Types,

    /// Load a folder and print the resulting entity graph.
    Graph(GraphArgs),

    /// Compute the cutoff-time table of a prediction problem.
    Cutoff(CutoffArgs),
}

#[derive(Parser)]
pub struct GraphArgs {
    /// Folder containing one CSV file per record type.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Print the graph summary as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct CutoffArgs {
    /// Folder containing one CSV file per record type.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Prediction problem to compute.
    #[arg(long = "problem", value_enum)]
    pub problem: ProblemKind,

    /// TOML file with problem settings.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Diagnosis code for the diagnosis problem (overrides the config file).
    #[arg(long = "code", value_name = "CODE")]
    pub code: Option<String>,

    /// Write the cutoff table here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
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

//! CLI argument definitions for the doctor booking front end.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "medbook",
    version,
    about = "Browse doctors and book appointments from the terminal",
    long_about = "Browse a doctor catalog, filter it by specialty and availability,\n\
                  and book or cancel appointments in a scripted session."
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

    /// Settings file (default: the platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List doctors, optionally filtered.
    Doctors(DoctorsArgs),

    /// List the specialties and availability times used by the filters.
    Options(CatalogArgs),

    /// Run an interactive session, reading commands from a script or stdin.
    Session(SessionArgs),

    /// Show the active settings, or write the defaults to disk.
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Catalog JSON file (default: settings, then the built-in catalog).
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalog: Option<PathBuf>,
}

#[derive(Args)]
pub struct DoctorsArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Only doctors with this specialty.
    #[arg(long = "specialty", value_name = "NAME")]
    pub specialty: Option<String>,

    /// Only available doctors with this slot time.
    #[arg(long = "time", value_name = "TIME")]
    pub time: Option<String>,

    /// Print the matching doctors as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct SessionArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Session script; commands are read from stdin when omitted.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Print the booked appointments as JSON when the session ends.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the current settings to the settings file.
    #[arg(long = "write")]
    pub write: bool,
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

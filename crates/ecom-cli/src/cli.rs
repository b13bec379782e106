//! CLI argument definitions for the pipeline driver.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ecom-pipeline",
    version,
    about = "E-commerce analytics pipeline: raw CSV to staging, production and warehouse",
    long_about = "Move raw e-commerce CSV extracts through staging, production and a \
                  star-schema warehouse.\n\n\
                  Each stage can run on its own; `run` executes them in order under an \
                  advisory lock."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Pipeline configuration file (TOML). Defaults apply when it does not exist.
    #[arg(
        long = "config",
        value_name = "PATH",
        default_value = "pipeline.toml",
        global = true
    )]
    pub config: PathBuf,

    /// Database file, overriding `[database].path`.
    #[arg(long = "database", value_name = "PATH", global = true)]
    pub database: Option<PathBuf>,

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
    /// Load the raw CSV files into the staging tables.
    Ingest,

    /// Clean, validate and load staging rows into production.
    Transform,

    /// Score data quality and write the quality report.
    Validate(ValidateArgs),

    /// Rebuild the star-schema warehouse from production.
    Warehouse,

    /// Check pipeline health and write the monitoring report.
    Monitor,

    /// Run every stage in order, then clean up expired working files.
    Run(RunArgs),

    /// Delete working files past the retention period.
    Cleanup(CleanupArgs),
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Reference date for future-dated transactions (default: today, UTC).
    #[arg(long = "as-of", value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Remove an existing run lock before starting.
    ///
    /// Use only when the previous run is known to have died; the lock is
    /// otherwise the only guard against two runs sharing one database.
    #[arg(long = "break-lock")]
    pub break_lock: bool,
}

#[derive(Parser)]
pub struct CleanupArgs {
    /// List what would be deleted without deleting anything.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "ecom-pipeline",
            "validate",
            "--as-of",
            "2024-06-01",
            "--database",
            "/tmp/x.db",
            "--log-format",
            "json",
        ])
        .unwrap();
        let Command::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.as_of, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.log_format, LogFormatArg::Json));
        assert_eq!(cli.config, PathBuf::from("pipeline.toml"));
    }

    #[test]
    fn run_and_cleanup_flags() {
        let cli = Cli::try_parse_from(["ecom-pipeline", "run", "--break-lock"]).unwrap();
        assert!(matches!(cli.command, Command::Run(RunArgs { break_lock: true })));
        let cli = Cli::try_parse_from(["ecom-pipeline", "cleanup", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Command::Cleanup(CleanupArgs { dry_run: true })));
    }

    #[test]
    fn malformed_as_of_is_rejected() {
        assert!(Cli::try_parse_from(["ecom-pipeline", "validate", "--as-of", "June 1"]).is_err());
    }
}

//! E-commerce analytics pipeline CLI.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use ecom_cli::logging::{LogConfig, LogFormat, init_logging};
use ecom_model::PipelineConfig;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    RunOutcome, run_all, run_cleanup, run_ingest, run_monitor, run_transform, run_validate,
    run_warehouse,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    match &cli.command {
        Command::Ingest => run_ingest(&config).map(drop),
        Command::Transform => run_transform(&config).map(drop),
        Command::Validate(args) => run_validate(&config, args.as_of).map(drop),
        Command::Warehouse => run_warehouse(&config).map(drop),
        Command::Monitor => run_monitor(&config).map(drop),
        Command::Run(args) => match run_all(&config, args.break_lock)? {
            RunOutcome::Completed => Ok(()),
            RunOutcome::Skipped { pid } => {
                match pid {
                    Some(pid) => eprintln!("skipped: pipeline already running (pid {pid})"),
                    None => eprintln!("skipped: run lock present"),
                }
                Ok(())
            }
        },
        Command::Cleanup(args) => run_cleanup(&config, args.dry_run).map(drop),
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load_or_default(&cli.config)
        .with_context(|| format!("load config {}", cli.config.display()))?;
    if let Some(path) = &cli.database {
        config.database.path = path.clone();
    }
    Ok(config)
}

/// Build logging configuration from CLI flags with consistent precedence.
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
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads the run configuration
//! - runs the requested pipeline stages
//! - prints reports or writes CSV/JSON exports

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;

use crate::cli::{Command, FetchArgs, OutputArgs, OutputFormat, RegistryArgs, ResolveArgs};
use crate::config::RunConfig;
use crate::error::{AppError, PipelineError};
use crate::fetch::SeriesFailure;
use crate::io::{ExportEnvelope, write_csv, write_csv_file, write_json, write_json_file};
use crate::registry::build_series_registry;
use crate::transport::HttpClient;

pub mod pipeline;

/// Entry point for the `macrocat` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(cli.verbose);

    match cli.command {
        Command::Registry(args) => handle_registry(args),
        Command::Resolve(args) => handle_resolve(args),
        Command::Fetch(args) => handle_fetch(args),
    }
}

fn handle_registry(args: RegistryArgs) -> Result<(), AppError> {
    let rows = build_series_registry(&args.country)?;
    let country = args.country.to_ascii_uppercase();
    emit(&args.output, &country, &rows, &[], || {
        crate::report::format_registry(&country, &rows)
    })
}

fn handle_resolve(args: ResolveArgs) -> Result<(), AppError> {
    let config = config_from_args(&args, None)?;
    let client = HttpClient::new(&config)?;
    let rows = pipeline::run_resolve(&args.country, &config, args.parallel, &client)?;

    let country = args.country.to_ascii_uppercase();
    emit(&args.output, &country, &rows, &[], || {
        crate::report::format_resolution(&country, &rows)
    })
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.resolve, args.aggregation)?;
    let client = HttpClient::new(&config)?;
    let run = pipeline::run_fetch(&args.resolve.country, &config, args.resolve.parallel, &client)?;

    let country = args.resolve.country.to_ascii_uppercase();
    emit(
        &args.resolve.output,
        &country,
        &run.outcome.observations,
        &run.outcome.failures,
        || crate::report::format_fetch(&country, &run.outcome),
    )
}

/// Environment config with CLI overrides applied.
fn config_from_args(
    args: &ResolveArgs,
    aggregation: Option<crate::domain::AggregationPolicy>,
) -> Result<RunConfig, AppError> {
    let mut config = RunConfig::from_env()?;
    if let Some(secs) = args.timeout {
        if secs == 0 {
            return Err(AppError::new(2, "--timeout must be > 0."));
        }
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(policy) = aggregation {
        config.aggregation = policy;
    }
    Ok(config)
}

/// Write `rows` in the requested format, to a file or stdout.
fn emit<T: Serialize>(
    output: &OutputArgs,
    country: &str,
    rows: &[T],
    failures: &[SeriesFailure],
    table: impl FnOnce() -> String,
) -> Result<(), AppError> {
    match (output.format, &output.output) {
        (OutputFormat::Table, None) => {
            print!("{}", table());
        }
        (OutputFormat::Table, Some(path)) => {
            std::fs::write(path, table()).map_err(|e| {
                AppError::new(5, format!("Failed to write report '{}': {e}", path.display()))
            })?;
        }
        (OutputFormat::Csv, Some(path)) => write_csv_file(path, rows)?,
        (OutputFormat::Csv, None) => write_csv(std::io::stdout().lock(), rows)?,
        (OutputFormat::Json, Some(path)) => {
            write_json_file(path, &ExportEnvelope::new(country, rows, failures))?;
        }
        (OutputFormat::Json, None) => {
            let mut stdout = std::io::stdout().lock();
            write_json(&mut stdout, &ExportEnvelope::new(country, rows, failures))?;
            writeln!(stdout).map_err(PipelineError::from)?;
        }
    }

    if let Some(path) = &output.output {
        tracing::info!(path = %path.display(), "output written");
    }
    Ok(())
}

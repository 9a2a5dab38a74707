//! Command-line parsing for the `macrocat` binary.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! registry / resolution / normalization code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::AggregationPolicy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "macrocat",
    version,
    about = "Macroeconomic indicator catalog: build, resolve and normalize World Bank / Eurostat / IMF series"
)]
pub struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the series registry for a country (no network access).
    Registry(RegistryArgs),
    /// Resolve and validate every registry endpoint.
    Resolve(ResolveArgs),
    /// Resolve endpoints, fetch every resolved series and print the normalized annual table.
    Fetch(FetchArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal report.
    Table,
    Csv,
    Json,
}

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write to a file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RegistryArgs {
    /// Two-letter country code (e.g. LT, DE, GR).
    #[arg(short = 'c', long, default_value = "LT")]
    pub country: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ResolveArgs {
    /// Two-letter country code (e.g. LT, DE, GR).
    #[arg(short = 'c', long, default_value = "LT")]
    pub country: String,

    /// Validate endpoints concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Per-request timeout in seconds (default: MACROCAT_TIMEOUT_SECS or 20).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// How sub-annual series collapse to annual (default: MACROCAT_AGGREGATION or mean).
    #[arg(long, value_enum)]
    pub aggregation: Option<AggregationPolicy>,
}

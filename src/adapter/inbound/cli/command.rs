//! Command-line interface definitions.
//!
//! Defines the CLI structure for ndvi-retriever using `clap`: one-off
//! retrievals, fallback store lookups and configuration checks.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::infrastructure::paths;

/// NDVI time series retrieval with local caching and a geospatial fallback
#[derive(Parser, Debug)]
#[command(name = "ndvi-retriever")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve the NDVI series for a point and date range
    Fetch(FetchArgs),

    /// Look up the nearest stored result without contacting the remote service
    Lookup(LookupArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `ndvi-retriever check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file and report available credentials.
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(clap::Args, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for `ndvi-retriever fetch`.
#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// Path to configuration file
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: String,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: String,

    /// First day of the range (MM-DD-YYYY)
    #[arg(long)]
    pub date_start: String,

    /// Last day of the range (MM-DD-YYYY)
    #[arg(long)]
    pub date_end: String,
}

/// Arguments for `ndvi-retriever lookup`.
#[derive(clap::Args, Debug)]
pub struct LookupArgs {
    /// Path to configuration file
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: String,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: String,

    /// Date the stored result must cover (MM-DD-YYYY); unparsable dates are ignored
    #[arg(long)]
    pub date: Option<String>,
}

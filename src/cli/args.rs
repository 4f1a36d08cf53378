//! Command-line argument definitions for the PNS processor
//!
//! This module defines the CLI interface using the clap derive API.

use crate::{Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the PNS bulletin processor
///
/// Converts National Weather Service Public Information Statements from raw
/// bulletin text into structured, idempotent CSV observation archives.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pns-processor",
    version,
    about = "Convert NWS Public Information Statements into structured observation archives",
    long_about = "Parses raw Public Information Statement (PNS) bulletin text into a canonical \
                  observation schema, archives one table set per bulletin keyed by station and \
                  issuance timestamp, and accumulates all per-station archives into a single \
                  master table for mapping and visualization."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the PNS processor
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse raw bulletins into per-station archives (main command)
    Process(ProcessArgs),
    /// Union all per-station archives into the master table
    Accumulate(AccumulateArgs),
    /// Report the configured field offices
    Stations(StationsArgs),
}

/// Arguments for the process command
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Archive root directory
    ///
    /// Each station owns <data-dir>/<station>/raw/ (bulletin text dropped by
    /// the fetcher) and <data-dir>/<station>/parsed_reports/ (output tables).
    /// Defaults to the platform data directory.
    #[arg(short = 'd', long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Stations to process as a comma-separated list, or ALL for every
    /// station directory present under the archive root
    #[arg(
        short = 's',
        long = "stations",
        value_name = "LIST",
        default_value = "ALL"
    )]
    pub stations: String,

    /// Field-office lookup table (identifier,name,url)
    #[arg(long = "stations-file", value_name = "PATH")]
    pub stations_file: Option<PathBuf>,

    /// Event-code lookup table (code,category)
    #[arg(long = "event-codes-file", value_name = "PATH")]
    pub event_codes_file: Option<PathBuf>,

    /// Reprocess bulletins whose archive artifacts already exist
    #[arg(long = "force")]
    pub force: bool,

    /// Enable verbose (debug) logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Suppress progress output, log warnings and errors only
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl ProcessArgs {
    /// Requested stations, or `None` for every station under the archive root
    pub fn station_list(&self) -> Option<Vec<String>> {
        if self.stations.trim().eq_ignore_ascii_case("ALL") {
            return None;
        }
        Some(
            self.stations
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            return Err(Error::configuration(
                "--verbose and --quiet are mutually exclusive",
            ));
        }
        if self.station_list().is_some_and(|list| list.is_empty()) {
            return Err(Error::configuration("no stations named in --stations"));
        }
        Ok(())
    }
}

/// Arguments for the accumulate command
#[derive(Debug, Clone, Parser)]
pub struct AccumulateArgs {
    /// Archive root directory
    #[arg(short = 'd', long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl AccumulateArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, false)
    }
}

/// Arguments for the stations command
#[derive(Debug, Clone, Parser)]
pub struct StationsArgs {
    /// Field-office lookup table (identifier,name,url)
    #[arg(long = "stations-file", value_name = "PATH")]
    pub stations_file: PathBuf,

    /// Enable verbose (debug) logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl StationsArgs {
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, false)
    }
}

fn log_level(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

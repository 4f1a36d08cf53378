//! Command implementations for the PNS processor CLI
//!
//! Contains the command dispatch, logging setup, per-station processing loop
//! with progress reporting, and run summaries. A failure in one station's
//! cycle never halts the run; every skip and warning lands in the log for
//! post-hoc audit.

use crate::app::services::accumulator::Accumulator;
use crate::app::services::archive_writer::ArchiveWriter;
use crate::app::services::bulletin_parser::BulletinParser;
use crate::app::services::station_registry::StationRegistry;
use crate::cli::args::{AccumulateArgs, Args, Commands, ProcessArgs, StationsArgs};
use crate::config::Config;
use crate::{Error, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Processing statistics for reporting
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Stations whose cycle completed
    pub stations_processed: usize,
    /// Stations skipped on a fatal per-station error
    pub stations_failed: usize,
    /// Bulletins parsed and written
    pub bulletins_written: usize,
    /// Bulletins skipped by the idempotency check
    pub bulletins_skipped: usize,
    /// Observations written across all bulletins
    pub observations_written: usize,
    /// Total processing time
    pub processing_time: std::time::Duration,
}

/// Main command dispatcher
pub async fn run(args: Args) -> Result<RunStats> {
    match args.command {
        Some(Commands::Process(process_args)) => run_process(process_args).await,
        Some(Commands::Accumulate(accumulate_args)) => run_accumulate(accumulate_args).await,
        Some(Commands::Stations(stations_args)) => run_stations(stations_args).await,
        None => Ok(RunStats::default()),
    }
}

/// Parse raw bulletins for the requested stations into per-station archives
async fn run_process(args: ProcessArgs) -> Result<RunStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level());
    args.validate()?;

    let config = build_config(&args);
    config.validate()?;
    info!("Archive root: {}", config.data_dir.display());

    let registry = Arc::new(StationRegistry::load(&config)?);
    let parser = BulletinParser::new();
    let writer = ArchiveWriter::new(config.clone(), Arc::clone(&registry));

    let stations = match args.station_list() {
        Some(stations) => stations,
        None => config.discover_stations()?,
    };
    if stations.is_empty() {
        warn!("No stations to process under {}", config.data_dir.display());
        return Ok(RunStats::default());
    }
    info!("Processing {} stations: {:?}", stations.len(), stations);

    let progress_bar = if args.show_progress() {
        let pb = ProgressBar::new(stations.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message("Initializing...");
        Some(pb)
    } else {
        None
    };

    let mut stats = RunStats::default();

    for (i, station) in stations.iter().enumerate() {
        if let Some(pb) = &progress_bar {
            pb.set_position(i as u64);
            pb.set_message(format!("Processing {}", station));
        }

        if registry.office_count() > 0 && !registry.is_known(station) {
            warn!("Station '{}' is not a configured field office", station);
        }

        match process_station(&config, &parser, &writer, station) {
            Ok(station_stats) => {
                stats.stations_processed += 1;
                stats.bulletins_written += station_stats.bulletins_written;
                stats.bulletins_skipped += station_stats.bulletins_skipped;
                stats.observations_written += station_stats.observations_written;
            }
            Err(e) => {
                // Fatal for this station's cycle only
                error!("Station {} failed: {}", station, e);
                stats.stations_failed += 1;
            }
        }
    }

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Processing complete");
    }

    stats.processing_time = start_time.elapsed();
    print_process_summary(&stats);
    Ok(stats)
}

/// Layer CLI arguments over the default configuration
fn build_config(args: &ProcessArgs) -> Config {
    let mut config = Config::default();
    if let Some(data_dir) = &args.data_dir {
        config = config.with_data_dir(data_dir);
    }
    if let Some(path) = &args.stations_file {
        config = config.with_stations_file(path);
    }
    if let Some(path) = &args.event_codes_file {
        config = config.with_event_codes_file(path);
    }
    if args.force {
        config = config.with_force_reprocess();
    }
    config
}

/// Per-station statistics from one cycle
#[derive(Debug, Clone, Default)]
struct StationStats {
    bulletins_written: usize,
    bulletins_skipped: usize,
    observations_written: usize,
}

/// Process every raw bulletin file present for one station.
///
/// A missing raw directory is the station's fatal error; a malformed
/// bulletin degrades inside the parser and is still archived.
fn process_station(
    config: &Config,
    parser: &BulletinParser,
    writer: &ArchiveWriter,
    station: &str,
) -> Result<StationStats> {
    let raw_dir = config.raw_dir(station);
    if !raw_dir.is_dir() {
        return Err(Error::missing_input(station, raw_dir.display().to_string()));
    }

    let mut bulletin_files: Vec<PathBuf> = std::fs::read_dir(&raw_dir)
        .map_err(|e| Error::io("failed to read raw directory", e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    bulletin_files.sort();

    if bulletin_files.is_empty() {
        return Err(Error::missing_input(station, raw_dir.display().to_string()));
    }

    let mut stats = StationStats::default();
    for file in &bulletin_files {
        debug!("Reading bulletin {}", file.display());
        let raw_text = std::fs::read_to_string(file)
            .map_err(|e| Error::io(format!("failed to read {}", file.display()), e))?;

        let bulletin = parser.parse(station, &raw_text);
        let observation_count = bulletin.observations.len();

        let outcome = writer.write_bulletin(&bulletin)?;
        if outcome.written {
            stats.bulletins_written += 1;
            stats.observations_written += observation_count;
        } else {
            stats.bulletins_skipped += 1;
        }
    }

    info!(
        "Station {}: {} bulletins written, {} skipped",
        station, stats.bulletins_written, stats.bulletins_skipped
    );
    Ok(stats)
}

/// Union all per-station archives into the master table
async fn run_accumulate(args: AccumulateArgs) -> Result<RunStats> {
    let start_time = Instant::now();
    setup_logging(args.get_log_level());

    let mut config = Config::default();
    if let Some(data_dir) = args.data_dir {
        config = config.with_data_dir(data_dir);
    }
    config.validate()?;

    let accumulate_stats = Accumulator::new(config.clone()).accumulate()?;

    println!();
    println!("{}", "Accumulation complete".green().bold());
    println!("  Tables read:        {}", accumulate_stats.tables_read);
    println!("  Rows in:            {}", accumulate_stats.rows_in);
    println!("  Rows out:           {}", accumulate_stats.rows_out);
    println!(
        "  Duplicates removed: {}",
        accumulate_stats.duplicates_removed
    );
    println!("  Master file:        {}", config.master_file().display());

    Ok(RunStats {
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}

/// Report the configured field offices
async fn run_stations(args: StationsArgs) -> Result<RunStats> {
    setup_logging(args.get_log_level());

    let config = Config::default().with_stations_file(&args.stations_file);
    config.validate()?;
    let registry = StationRegistry::load(&config)?;

    println!("{}", "Configured field offices".bold());
    for office in registry.offices() {
        match &office.url {
            Some(url) => println!("  {}  {} ({})", office.identifier, office.name, url),
            None => println!("  {}  {}", office.identifier, office.name),
        }
    }
    println!("{} offices", registry.office_count());

    Ok(RunStats::default())
}

/// Set up structured logging with an env-filter override
fn setup_logging(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pns_processor={}", log_level)));

    // Ignore a second init in the same process (tests call commands directly)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn print_process_summary(stats: &RunStats) {
    println!();
    println!("{}", "Processing complete".green().bold());
    println!("  Stations processed:   {}", stats.stations_processed);
    if stats.stations_failed > 0 {
        println!(
            "  Stations failed:      {}",
            stats.stations_failed.to_string().red()
        );
    }
    println!("  Bulletins written:    {}", stats.bulletins_written);
    println!("  Bulletins skipped:    {}", stats.bulletins_skipped);
    println!("  Observations written: {}", stats.observations_written);
    println!("  Elapsed:              {:.2?}", stats.processing_time);
}

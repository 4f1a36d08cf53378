//! End-to-end pipeline tests
//!
//! Exercise the full flow on a temporary archive: parse raw bulletin text,
//! write per-bulletin tables, re-run to verify the idempotency contract,
//! and accumulate everything into the master table.

use pns_processor::app::services::accumulator::Accumulator;
use pns_processor::app::services::archive_writer::ArchiveWriter;
use pns_processor::app::services::bulletin_parser::BulletinParser;
use pns_processor::app::services::station_registry::StationRegistry;
use pns_processor::cli::args::Args;
use pns_processor::cli::commands;
use pns_processor::config::Config;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

const STRUCTURED_BULLETIN: &str = "\
NOUS41 KOKX 250203
PNSOKX
CTZ005>012-NJZ010>015-032130-

Public Information Statement
National Weather Service
New York NY
831 AM EST Mon Feb 3 2025

...SNOWFALL REPORTS...

**METADATA**
:1/19/2025,1000 PM, CT, Fairfield, Stamford, , , 41.02, -73.56, SNOW_24, 2, Inch, Public, 24 hour snowfall
:1/19/2025,945 PM, CT, New Haven, Milford, , , 41.22, -73.06, SNOW_24, 2.5, Inch, Trained Spotter, 24 hour snowfall
";

const ALTERNATIVE_BULLETIN: &str = "\
NOUS41 KBOX 250119
PNSBOX

Public Information Statement
National Weather Service
Boston/Norton MA
1000 PM EST Sun Jan 19 2025

...Storm Total Snowfall...

Location          Temp        Amount
...Fairfield County...
Stamford, CT       32F         3.5 in
Norwalk, CT        31F         2.8 in
";

/// Snapshot of every file under a directory with its contents
fn archive_snapshot(root: &Path) -> Vec<(String, String)> {
    let mut snapshot = Vec::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry.unwrap();
        if entry.file_type().is_file() {
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .to_string();
            let content = std::fs::read_to_string(entry.path()).unwrap();
            snapshot.push((relative, content));
        }
    }
    snapshot
}

fn pipeline_for(dir: &Path) -> (BulletinParser, ArchiveWriter, Accumulator) {
    let config = Config::default().with_data_dir(dir);
    let registry = Arc::new(StationRegistry::with_defaults());
    (
        BulletinParser::new(),
        ArchiveWriter::new(config.clone(), registry),
        Accumulator::new(config),
    )
}

#[test]
fn rerunning_the_pipeline_reproduces_the_archive_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let (parser, writer, accumulator) = pipeline_for(dir.path());

    let okx = parser.parse("OKX", STRUCTURED_BULLETIN);
    let box_bulletin = parser.parse("BOX", ALTERNATIVE_BULLETIN);

    assert!(writer.write_bulletin(&okx).unwrap().written);
    assert!(writer.write_bulletin(&box_bulletin).unwrap().written);
    accumulator.accumulate().unwrap();
    let first = archive_snapshot(dir.path());

    // Second run over identical bulletin text: no second write, no new rows
    assert!(!writer.write_bulletin(&okx).unwrap().written);
    assert!(!writer.write_bulletin(&box_bulletin).unwrap().written);
    accumulator.accumulate().unwrap();
    let second = archive_snapshot(dir.path());

    assert_eq!(first, second);
}

#[test]
fn master_table_carries_both_layouts() {
    let dir = tempfile::tempdir().unwrap();
    let (parser, writer, accumulator) = pipeline_for(dir.path());

    writer
        .write_bulletin(&parser.parse("OKX", STRUCTURED_BULLETIN))
        .unwrap();
    writer
        .write_bulletin(&parser.parse("BOX", ALTERNATIVE_BULLETIN))
        .unwrap();
    let stats = accumulator.accumulate().unwrap();

    assert_eq!(stats.tables_read, 2);
    assert_eq!(stats.rows_out, 4);

    let config = Config::default().with_data_dir(dir.path());
    let master = std::fs::read_to_string(config.master_file()).unwrap();
    assert!(
        master
            .lines()
            .next()
            .unwrap()
            .starts_with("station,date,time,state,county,city")
    );
    // Structured rows keep their published date; alternative rows are keyed
    // by the bulletin's issuance date
    assert!(master.contains("OKX,1/19/2025,1000 PM,CT,Fairfield,Stamford"));
    assert!(master.contains("BOX,2025-01-19,1000PM,CT,,Stamford"));
}

#[test]
fn bulletin_versions_archive_under_distinct_issuance_keys() {
    let dir = tempfile::tempdir().unwrap();
    let (parser, writer, _) = pipeline_for(dir.path());

    let morning = parser.parse("OKX", STRUCTURED_BULLETIN);
    let evening_text = STRUCTURED_BULLETIN.replace(
        "831 AM EST Mon Feb 3 2025",
        "700 PM EST Mon Feb 3 2025",
    );
    let evening = parser.parse("OKX", &evening_text);

    assert!(writer.write_bulletin(&morning).unwrap().written);
    assert!(writer.write_bulletin(&evening).unwrap().written);

    let reports = Config::default()
        .with_data_dir(dir.path())
        .parsed_reports_dir("OKX");
    assert!(reports.join("2025-02-03_831AM").is_dir());
    assert!(reports.join("2025-02-03_700PM").is_dir());
}

#[test]
fn unparsable_timestamps_share_the_sentinel_key() {
    let dir = tempfile::tempdir().unwrap();
    let (parser, writer, _) = pipeline_for(dir.path());

    let first = parser.parse("ALY", "**METADATA**\n:1/1/2025,900 AM, NY, Albany, Albany, , , , , SNOW, 1, Inch, Public, snow\n");
    let second = parser.parse("ALY", "**METADATA**\n:1/2/2025,900 AM, NY, Albany, Albany, , , , , SNOW, 2, Inch, Public, snow\n");

    assert!(first.issuance.is_unknown());
    assert!(writer.write_bulletin(&first).unwrap().written);
    // Accepted tradeoff: the second unparsable bulletin collides on the
    // sentinel key and is skipped
    assert!(!writer.write_bulletin(&second).unwrap().written);
}

#[tokio::test]
async fn process_and_accumulate_commands_run_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let raw_dir = dir.path().join("OKX").join("raw");
    std::fs::create_dir_all(&raw_dir).unwrap();
    std::fs::write(raw_dir.join("page_1.txt"), STRUCTURED_BULLETIN).unwrap();

    let data_dir = dir.path().to_string_lossy().to_string();
    let args = Args::parse_from([
        "pns-processor",
        "process",
        "--data-dir",
        &data_dir,
        "--quiet",
    ]);
    let stats = commands::run(args).await.unwrap();

    assert_eq!(stats.stations_processed, 1);
    assert_eq!(stats.bulletins_written, 1);
    assert_eq!(stats.observations_written, 2);

    let args = Args::parse_from(["pns-processor", "accumulate", "--data-dir", &data_dir]);
    commands::run(args).await.unwrap();

    let master = dir
        .path()
        .join("ALL_STATIONS")
        .join("all_stations_all_dates.csv");
    assert!(master.is_file());
    assert_eq!(std::fs::read_to_string(master).unwrap().lines().count(), 3);

    // A second process run is a no-op thanks to the idempotency check
    let args = Args::parse_from([
        "pns-processor",
        "process",
        "--data-dir",
        &data_dir,
        "--quiet",
    ]);
    let stats = commands::run(args).await.unwrap();
    assert_eq!(stats.bulletins_written, 0);
    assert_eq!(stats.bulletins_skipped, 1);
}

#[tokio::test]
async fn missing_station_input_fails_that_station_only() {
    let dir = tempfile::tempdir().unwrap();
    let raw_dir = dir.path().join("OKX").join("raw");
    std::fs::create_dir_all(&raw_dir).unwrap();
    std::fs::write(raw_dir.join("page_1.txt"), STRUCTURED_BULLETIN).unwrap();
    // ALY exists but has no raw bulletins: fatal for ALY's cycle only
    std::fs::create_dir_all(dir.path().join("ALY").join("raw")).unwrap();

    let data_dir = dir.path().to_string_lossy().to_string();
    let args = Args::parse_from([
        "pns-processor",
        "process",
        "--data-dir",
        &data_dir,
        "--quiet",
    ]);
    let stats = commands::run(args).await.unwrap();

    assert_eq!(stats.stations_processed, 1);
    assert_eq!(stats.stations_failed, 1);
    assert_eq!(stats.bulletins_written, 1);
}

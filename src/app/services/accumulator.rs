//! Master-table accumulation
//!
//! Unions every per-station observations table with the prior cumulative
//! master table into one replacement master, deduplicated by full-row
//! structural equality. Runs strictly after all per-station parses for the
//! cycle, since it scans the whole archive tree.
//!
//! The master file is the one piece of shared mutable state in the system.
//! The contract is read-existing + read-new + deduplicate + write-whole-file,
//! so concurrent writers are unsafe; this stage runs as a single daily batch
//! job (a stated constraint, not a silent assumption).

use crate::config::Config;
use crate::constants::{
    MASTER_STATION_COLUMN, OBSERVATION_COLUMNS, OBSERVATIONS_FILE_NAME, PARSED_REPORTS_DIR_NAME,
};
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Outcome of one accumulation cycle
#[derive(Debug, Clone, Default)]
pub struct AccumulateStats {
    /// Per-bulletin tables read (excluding the prior master)
    pub tables_read: usize,

    /// Rows seen across prior master and per-bulletin tables
    pub rows_in: usize,

    /// Rows surviving deduplication
    pub rows_out: usize,

    /// Exact duplicates dropped
    pub duplicates_removed: usize,
}

/// Builds the cumulative all-stations master table
#[derive(Debug, Clone)]
pub struct Accumulator {
    config: Config,
}

impl Accumulator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Union the prior master with every per-station observations table and
    /// rewrite the master whole-file.
    ///
    /// Row identity is the full field tuple including the station column;
    /// first-seen rows win, so prior master content keeps its order and new
    /// rows append behind it.
    pub fn accumulate(&self) -> Result<AccumulateStats> {
        let mut stats = AccumulateStats::default();
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let mut rows: Vec<Vec<String>> = Vec::new();

        let master_file = self.config.master_file();
        if master_file.is_file() {
            let master_rows = read_rows(&master_file)?;
            debug!(
                "Loaded existing master file with {} rows",
                master_rows.len()
            );
            for row in master_rows {
                stats.rows_in += 1;
                if seen.insert(row.clone()) {
                    rows.push(row);
                } else {
                    stats.duplicates_removed += 1;
                }
            }
        }

        for table in self.discover_observation_tables()? {
            let Some(station) = station_for_table(&table) else {
                warn!("Cannot determine station for {}", table.display());
                continue;
            };

            let table_rows = match read_rows(&table) {
                Ok(table_rows) => table_rows,
                Err(e) => {
                    warn!("Error reading {}: {}", table.display(), e);
                    continue;
                }
            };

            stats.tables_read += 1;
            for mut row in table_rows {
                row.insert(0, station.clone());
                stats.rows_in += 1;
                if seen.insert(row.clone()) {
                    rows.push(row);
                } else {
                    stats.duplicates_removed += 1;
                }
            }
        }

        stats.rows_out = rows.len();
        self.write_master(&master_file, &rows)?;

        info!(
            "Accumulated {} tables into master: {} rows in, {} rows out, {} duplicates removed",
            stats.tables_read, stats.rows_in, stats.rows_out, stats.duplicates_removed
        );
        Ok(stats)
    }

    /// Every per-bulletin observations table under the archive root, in a
    /// deterministic order.
    fn discover_observation_tables(&self) -> Result<Vec<PathBuf>> {
        let mut tables = Vec::new();
        if !self.config.data_dir.is_dir() {
            return Ok(tables);
        }

        for entry in WalkDir::new(&self.config.data_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.file_name().and_then(|n| n.to_str()) == Some(OBSERVATIONS_FILE_NAME)
                && in_parsed_reports(path)
            {
                tables.push(path.to_path_buf());
            }
        }
        Ok(tables)
    }

    /// Whole-file replacement write of the master table
    fn write_master(&self, master_file: &Path, rows: &[Vec<String>]) -> Result<()> {
        std::fs::create_dir_all(self.config.all_stations_dir())
            .map_err(|e| Error::io("failed to create ALL_STATIONS directory", e))?;

        let mut writer = csv::Writer::from_path(master_file).map_err(|e| {
            Error::csv(format!("failed to open {}", master_file.display()), Some(e))
        })?;

        let mut header = vec![MASTER_STATION_COLUMN.to_string()];
        header.extend(OBSERVATION_COLUMNS.iter().map(|c| c.to_string()));
        writer.write_record(&header)?;

        for row in rows {
            writer.write_record(row)?;
        }
        writer
            .flush()
            .map_err(|e| Error::io("failed to flush master file", e))?;
        Ok(())
    }
}

/// Only canonical per-bulletin tables live under a parsed_reports directory.
/// The grouped region/event views and the master itself are excluded.
fn in_parsed_reports(path: &Path) -> bool {
    path.parent()
        .and_then(|bulletin_dir| bulletin_dir.parent())
        .and_then(|reports_dir| reports_dir.file_name())
        .and_then(|name| name.to_str())
        == Some(PARSED_REPORTS_DIR_NAME)
}

/// Station identifier from `<data_dir>/<station>/parsed_reports/<key>/observations.csv`
fn station_for_table(path: &Path) -> Option<String> {
    let components: Vec<&str> = path
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    let reports_index = components
        .iter()
        .rposition(|c| *c == PARSED_REPORTS_DIR_NAME)?;
    components
        .get(reports_index.checked_sub(1)?)
        .map(|s| s.to_string())
}

/// Read a CSV table's data rows, skipping its header
fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::csv(format!("failed to open {}", path.display()), Some(e)))?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result
            .map_err(|e| Error::csv(format!("malformed row in {}", path.display()), Some(e)))?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::archive_writer::ArchiveWriter;
    use crate::app::services::bulletin_parser::BulletinParser;
    use crate::app::services::station_registry::StationRegistry;
    use std::sync::Arc;

    fn archive_bulletin(dir: &Path, station: &str, text: &str) {
        let config = Config::default().with_data_dir(dir);
        let writer = ArchiveWriter::new(config, Arc::new(StationRegistry::with_defaults()));
        let bulletin = BulletinParser::new().parse(station, text);
        writer.write_bulletin(&bulletin).unwrap();
    }

    fn bulletin_text(time_line: &str, row: &str) -> String {
        format!(
            "Public Information Statement\nNational Weather Service\n{}\n\n**METADATA**\n{}\n",
            time_line, row
        )
    }

    #[test]
    fn master_unions_stations_with_a_station_column() {
        let dir = tempfile::tempdir().unwrap();
        archive_bulletin(
            dir.path(),
            "OKX",
            &bulletin_text(
                "831 AM EST Mon Feb 3 2025",
                ":1/19/2025,1000 PM, CT, Fairfield, Stamford, , , 41.02, -73.56, SNOW_24, 2, Inch, Public, 24 hour snowfall",
            ),
        );
        archive_bulletin(
            dir.path(),
            "ALY",
            &bulletin_text(
                "900 AM EST Mon Feb 3 2025",
                ":1/19/2025,900 PM, NY, Albany, Albany, , , 42.65, -73.75, SNOW_24, 4, Inch, Public, 24 hour snowfall",
            ),
        );

        let config = Config::default().with_data_dir(dir.path());
        let stats = Accumulator::new(config.clone()).accumulate().unwrap();

        assert_eq!(stats.tables_read, 2);
        assert_eq!(stats.rows_out, 2);

        let master = std::fs::read_to_string(config.master_file()).unwrap();
        let mut lines = master.lines();
        assert!(lines.next().unwrap().starts_with("station,date,time,state"));
        assert!(master.contains("ALY,1/19/2025"));
        assert!(master.contains("OKX,1/19/2025"));
    }

    #[test]
    fn rerunning_accumulation_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        archive_bulletin(
            dir.path(),
            "OKX",
            &bulletin_text(
                "831 AM EST Mon Feb 3 2025",
                ":1/19/2025,1000 PM, CT, Fairfield, Stamford, , , 41.02, -73.56, SNOW_24, 2, Inch, Public, 24 hour snowfall",
            ),
        );

        let config = Config::default().with_data_dir(dir.path());
        Accumulator::new(config.clone()).accumulate().unwrap();
        let first = std::fs::read_to_string(config.master_file()).unwrap();

        let stats = Accumulator::new(config.clone()).accumulate().unwrap();
        let second = std::fs::read_to_string(config.master_file()).unwrap();

        assert_eq!(first, second);
        assert_eq!(stats.rows_out, 1);
        // The master row and the re-read bulletin row collapse to one
        assert_eq!(stats.duplicates_removed, 1);
    }

    #[test]
    fn identical_rows_across_stations_stay_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let row = ":1/19/2025,1000 PM, CT, Fairfield, Stamford, , , 41.02, -73.56, SNOW_24, 2, Inch, Public, 24 hour snowfall";
        archive_bulletin(
            dir.path(),
            "OKX",
            &bulletin_text("831 AM EST Mon Feb 3 2025", row),
        );
        archive_bulletin(
            dir.path(),
            "BOX",
            &bulletin_text("831 AM EST Mon Feb 3 2025", row),
        );

        let config = Config::default().with_data_dir(dir.path());
        let stats = Accumulator::new(config).accumulate().unwrap();

        // Same observation text, different station partition
        assert_eq!(stats.rows_out, 2);
    }

    #[test]
    fn empty_archive_produces_header_only_master() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_data_dir(dir.path());

        let stats = Accumulator::new(config.clone()).accumulate().unwrap();

        assert_eq!(stats.rows_out, 0);
        let master = std::fs::read_to_string(config.master_file()).unwrap();
        assert_eq!(master.lines().count(), 1);
    }

    #[test]
    fn grouped_views_are_not_double_counted() {
        let dir = tempfile::tempdir().unwrap();
        archive_bulletin(
            dir.path(),
            "OKX",
            &bulletin_text(
                "831 AM EST Mon Feb 3 2025",
                ":1/19/2025,1000 PM, CT, Fairfield, Stamford, , , 41.02, -73.56, SNOW_24, 2, Inch, Public, 24 hour snowfall",
            ),
        );

        let config = Config::default().with_data_dir(dir.path());
        let stats = Accumulator::new(config).accumulate().unwrap();

        // regions/ and events/ views exist on disk but only the canonical
        // table feeds the master
        assert_eq!(stats.tables_read, 1);
        assert_eq!(stats.rows_out, 1);
    }
}

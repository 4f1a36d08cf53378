//! Idempotent per-bulletin archive writes
//!
//! For each parsed bulletin this service persists three tables under
//! `<data_dir>/<station>/parsed_reports/<date>_<time>/`: the canonical
//! observations, the bulletin metadata, and the verbatim header lines. It
//! also writes region- and event-grouped views of the observations for
//! downstream mapping.
//!
//! Writing is idempotent: if all three canonical tables already exist for
//! the station + issuance-timestamp key, the bulletin is skipped entirely.
//! Re-processing an already-seen timestamp is a deliberate no-op, never an
//! overwrite.

use crate::app::models::Observation;
use crate::app::services::bulletin_parser::ParsedBulletin;
use crate::app::services::station_registry::StationRegistry;
use crate::config::Config;
use crate::constants::{
    EVENTS_DIR_NAME, HEADER_METADATA_FILE_NAME, METADATA_FILE_NAME, OBSERVATION_COLUMNS,
    OBSERVATIONS_FILE_NAME, REGIONS_DIR_NAME,
};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// What happened to one bulletin's write
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// False when the idempotency check skipped the write
    pub written: bool,

    /// Directory holding this bulletin's tables
    pub output_dir: PathBuf,
}

/// Writes parsed bulletins into the per-station archive
#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    config: Config,
    registry: Arc<StationRegistry>,
}

impl ArchiveWriter {
    pub fn new(config: Config, registry: Arc<StationRegistry>) -> Self {
        Self { config, registry }
    }

    /// Persist one bulletin's tables, honoring the idempotency contract.
    ///
    /// Returns `written: false` when artifacts for this station + issuance
    /// key already exist (and reprocessing is not forced). The caller is
    /// informed, never surprised by an exception.
    pub fn write_bulletin(&self, bulletin: &ParsedBulletin) -> Result<WriteOutcome> {
        let key = bulletin.issuance.archive_key();
        let output_dir = self
            .config
            .parsed_reports_dir(&bulletin.station)
            .join(&key);

        if !self.config.force_reprocess && tables_exist(&output_dir) {
            info!(
                "Archive already holds {} {} - skipping write",
                bulletin.station, key
            );
            return Ok(WriteOutcome {
                written: false,
                output_dir,
            });
        }

        std::fs::create_dir_all(&output_dir)
            .map_err(|e| Error::io("failed to create bulletin output directory", e))?;

        write_observations(
            &output_dir.join(OBSERVATIONS_FILE_NAME),
            &bulletin.observations,
        )?;
        write_metadata(&output_dir.join(METADATA_FILE_NAME), bulletin)?;
        write_header_lines(
            &output_dir.join(HEADER_METADATA_FILE_NAME),
            &bulletin.header_lines,
        )?;

        self.write_region_views(&output_dir, &bulletin.observations)?;
        self.write_event_views(&output_dir, &bulletin.observations)?;

        info!(
            "Archived bulletin {} {} ({} observations)",
            bulletin.station,
            key,
            bulletin.observations.len()
        );

        Ok(WriteOutcome {
            written: true,
            output_dir,
        })
    }

    /// Observations grouped by state under `regions/`
    fn write_region_views(&self, output_dir: &Path, observations: &[Observation]) -> Result<()> {
        let mut by_state: BTreeMap<String, Vec<&Observation>> = BTreeMap::new();
        for obs in observations {
            if obs.state.is_empty() {
                continue;
            }
            by_state.entry(obs.state.clone()).or_default().push(obs);
        }

        if by_state.is_empty() {
            return Ok(());
        }

        let regions_dir = output_dir.join(REGIONS_DIR_NAME);
        std::fs::create_dir_all(&regions_dir)
            .map_err(|e| Error::io("failed to create regions directory", e))?;

        for (state, group) in by_state {
            let file = regions_dir.join(format!("{}_observations.csv", sanitize(&state)));
            write_observation_refs(&file, &group)?;
            debug!("Wrote {} rows to {}", group.len(), file.display());
        }
        Ok(())
    }

    /// Observations grouped by event category and type under `events/`
    fn write_event_views(&self, output_dir: &Path, observations: &[Observation]) -> Result<()> {
        let mut by_type: BTreeMap<String, Vec<&Observation>> = BTreeMap::new();
        for obs in observations {
            by_type.entry(obs.event_type.clone()).or_default().push(obs);
        }

        if by_type.is_empty() {
            return Ok(());
        }

        for (event_type, group) in by_type {
            let category = self.registry.classify_event(&event_type);
            let event_dir = output_dir.join(EVENTS_DIR_NAME).join(category);
            std::fs::create_dir_all(&event_dir)
                .map_err(|e| Error::io("failed to create event directory", e))?;

            let file = event_dir.join(format!("{}_observations.csv", sanitize(&event_type)));
            write_observation_refs(&file, &group)?;
            debug!("Wrote {} rows to {}", group.len(), file.display());
        }
        Ok(())
    }
}

/// The idempotency check covers the three canonical tables
fn tables_exist(output_dir: &Path) -> bool {
    [
        OBSERVATIONS_FILE_NAME,
        METADATA_FILE_NAME,
        HEADER_METADATA_FILE_NAME,
    ]
    .iter()
    .all(|name| output_dir.join(name).is_file())
}

fn write_observations(path: &Path, observations: &[Observation]) -> Result<()> {
    let refs: Vec<&Observation> = observations.iter().collect();
    write_observation_refs(path, &refs)
}

/// Whole-file write with the canonical column order, header always present
fn write_observation_refs(path: &Path, observations: &[&Observation]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::csv(format!("failed to open {}", path.display()), Some(e)))?;

    writer.write_record(OBSERVATION_COLUMNS)?;
    for obs in observations {
        writer.write_record(observation_record(obs))?;
    }
    writer.flush().map_err(|e| Error::io("failed to flush observations", e))?;
    Ok(())
}

/// Render one observation in the canonical column order; absent floats are
/// empty cells.
fn observation_record(obs: &Observation) -> Vec<String> {
    vec![
        obs.date.clone(),
        obs.time.clone(),
        obs.state.clone(),
        obs.county.clone(),
        obs.city.clone(),
        obs.latitude.map(|v| v.to_string()).unwrap_or_default(),
        obs.longitude.map(|v| v.to_string()).unwrap_or_default(),
        obs.event_type.clone(),
        obs.value.map(|v| v.to_string()).unwrap_or_default(),
        obs.unit.clone(),
        obs.source.clone(),
        obs.description.clone(),
    ]
}

fn write_metadata(path: &Path, bulletin: &ParsedBulletin) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::csv(format!("failed to open {}", path.display()), Some(e)))?;

    let metadata = &bulletin.metadata;
    writer.write_record([
        "issuance_code",
        "region_codes",
        "timestamp",
        "public_info",
        "nws_office",
        "nws_time",
    ])?;
    writer.write_record([
        metadata.issuance_code.as_deref().unwrap_or(""),
        metadata.region_codes.as_deref().unwrap_or(""),
        metadata.timestamp.as_deref().unwrap_or(""),
        metadata.public_info.as_deref().unwrap_or(""),
        metadata.nws_office.as_deref().unwrap_or(""),
        metadata.nws_time.as_deref().unwrap_or(""),
    ])?;
    writer.flush().map_err(|e| Error::io("failed to flush metadata", e))?;
    Ok(())
}

fn write_header_lines(path: &Path, header_lines: &[String]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::csv(format!("failed to open {}", path.display()), Some(e)))?;

    writer.write_record(["header_line"])?;
    for line in header_lines {
        writer.write_record([line.as_str()])?;
    }
    writer.flush().map_err(|e| Error::io("failed to flush header lines", e))?;
    Ok(())
}

/// File-name component from free text
fn sanitize(text: &str) -> String {
    text.replace([' ', '/'], "_").to_lowercase()
}

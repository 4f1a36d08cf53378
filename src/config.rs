//! Configuration management for the PNS processor.
//!
//! All lookup-table paths and the archive root are passed in explicitly
//! through [`Config`]; nothing is loaded as an import-time side effect.

use crate::constants::{
    ALL_STATIONS_DIR_NAME, MASTER_FILE_NAME, PARSED_REPORTS_DIR_NAME, RAW_DIR_NAME,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global configuration for a processing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the bulletin archive. Each station owns
    /// `<data_dir>/<station>/{raw,parsed_reports}/`; the cumulative master
    /// table lives in `<data_dir>/ALL_STATIONS/`.
    pub data_dir: PathBuf,

    /// Optional field-office lookup table (`identifier,name,url`)
    pub stations_file: Option<PathBuf>,

    /// Optional event-code lookup table (`code,category`) overriding the
    /// built-in default mapping
    pub event_codes_file: Option<PathBuf>,

    /// Reprocess bulletins whose archive artifacts already exist
    pub force_reprocess: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            stations_file: None,
            event_codes_file: None,
            force_reprocess: false,
        }
    }
}

/// Platform data directory fallback, `./data` when the platform exposes none
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("pns-processor"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

impl Config {
    /// Set the archive root
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Set the field-office lookup table path
    pub fn with_stations_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stations_file = Some(path.into());
        self
    }

    /// Set the event-code lookup table path
    pub fn with_event_codes_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.event_codes_file = Some(path.into());
        self
    }

    /// Enable reprocessing of already-archived bulletins
    pub fn with_force_reprocess(mut self) -> Self {
        self.force_reprocess = true;
        self
    }

    /// Validate the configuration before a run
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(Error::configuration("data directory must not be empty"));
        }
        if let Some(path) = &self.stations_file
            && !path.is_file()
        {
            return Err(Error::configuration(format!(
                "stations file not found: {}",
                path.display()
            )));
        }
        if let Some(path) = &self.event_codes_file
            && !path.is_file()
        {
            return Err(Error::configuration(format!(
                "event codes file not found: {}",
                path.display()
            )));
        }
        Ok(())
    }

    /// Directory holding a station's raw bulletin text files
    pub fn raw_dir(&self, station: &str) -> PathBuf {
        self.data_dir.join(station).join(RAW_DIR_NAME)
    }

    /// Directory holding a station's parsed per-bulletin tables
    pub fn parsed_reports_dir(&self, station: &str) -> PathBuf {
        self.data_dir.join(station).join(PARSED_REPORTS_DIR_NAME)
    }

    /// Directory holding the cumulative master table
    pub fn all_stations_dir(&self) -> PathBuf {
        self.data_dir.join(ALL_STATIONS_DIR_NAME)
    }

    /// Path of the cumulative master table
    pub fn master_file(&self) -> PathBuf {
        self.all_stations_dir().join(MASTER_FILE_NAME)
    }

    /// Station directories currently present under the archive root
    pub fn discover_stations(&self) -> Result<Vec<String>> {
        let mut stations = Vec::new();
        if !self.data_dir.is_dir() {
            return Ok(stations);
        }
        for entry in std::fs::read_dir(&self.data_dir)
            .map_err(|e| Error::io("failed to read archive root", e))?
        {
            let entry = entry.map_err(|e| Error::io("failed to read archive entry", e))?;
            let path = entry.path();
            if path.is_dir() && is_station_dir(&path) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    stations.push(name.to_string());
                }
            }
        }
        stations.sort();
        Ok(stations)
    }
}

/// A station directory carries a raw/ or parsed_reports/ subdirectory; the
/// ALL_STATIONS aggregate is not a station.
fn is_station_dir(path: &Path) -> bool {
    if path.file_name().and_then(|n| n.to_str()) == Some(ALL_STATIONS_DIR_NAME) {
        return false;
    }
    path.join(RAW_DIR_NAME).is_dir() || path.join(PARSED_REPORTS_DIR_NAME).is_dir()
}

//! Station registry service for field-office and event-code lookups
//!
//! Loads the reference lookup tables (issuing field offices and event-code
//! categories) from CSV files passed in explicitly via configuration, and
//! indexes them for O(1) access. Nothing here is global state; the registry
//! is constructed once per run and handed to the pipeline.

use crate::config::Config;
use crate::constants::event_categories;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// An issuing weather field office. Used as a partition key for extraction
/// and archive storage, not a first-class entity with behavior.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldOffice {
    /// Office identifier, e.g. `OKX`
    pub identifier: String,

    /// Display name, e.g. `New York-Upton`
    pub name: String,

    /// PNS product page for this office
    #[serde(default)]
    pub url: Option<String>,
}

/// One row of the event-code lookup table
#[derive(Debug, Clone, Deserialize)]
struct EventCodeRow {
    code: String,
    category: String,
}

/// Registry of field offices and event-code categories
#[derive(Debug, Clone)]
pub struct StationRegistry {
    /// Field offices indexed by uppercase identifier
    offices: HashMap<String, FieldOffice>,

    /// Event categories indexed by uppercase event code
    event_codes: HashMap<String, String>,
}

impl StationRegistry {
    /// Build a registry from the lookup tables named in the configuration.
    ///
    /// A missing stations file leaves the office index empty (stations are
    /// then taken solely from the archive layout); a missing event-code file
    /// falls back to the built-in default mapping.
    pub fn load(config: &Config) -> Result<Self> {
        let offices = match &config.stations_file {
            Some(path) => load_field_offices(path)?,
            None => HashMap::new(),
        };

        let event_codes = match &config.event_codes_file {
            Some(path) => load_event_codes(path)?,
            None => default_event_codes(),
        };

        info!(
            "Station registry loaded: {} field offices, {} event codes",
            offices.len(),
            event_codes.len()
        );

        Ok(Self {
            offices,
            event_codes,
        })
    }

    /// Registry with no offices and the default event-code mapping
    pub fn with_defaults() -> Self {
        Self {
            offices: HashMap::new(),
            event_codes: default_event_codes(),
        }
    }

    /// Look up a field office by identifier, case-insensitively
    pub fn office(&self, identifier: &str) -> Option<&FieldOffice> {
        self.offices.get(&identifier.to_uppercase())
    }

    /// True if the identifier names a configured field office
    pub fn is_known(&self, identifier: &str) -> bool {
        self.office(identifier).is_some()
    }

    /// All configured field offices, sorted by identifier
    pub fn offices(&self) -> Vec<&FieldOffice> {
        let mut offices: Vec<_> = self.offices.values().collect();
        offices.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        offices
    }

    pub fn office_count(&self) -> usize {
        self.offices.len()
    }

    /// Resolve an event code to its category; unmapped codes fall into
    /// the catch-all.
    pub fn classify_event(&self, code: &str) -> &str {
        self.event_codes
            .get(&code.trim().to_uppercase())
            .map(String::as_str)
            .unwrap_or(event_categories::OTHER)
    }
}

/// Load `identifier,name,url` rows into the office index
fn load_field_offices(path: &Path) -> Result<HashMap<String, FieldOffice>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| {
            Error::station_registry(format!(
                "failed to open stations file {}: {}",
                path.display(),
                e
            ))
        })?;

    let mut offices = HashMap::new();
    for result in reader.deserialize() {
        let office: FieldOffice = result.map_err(|e| {
            Error::station_registry(format!(
                "malformed row in stations file {}: {}",
                path.display(),
                e
            ))
        })?;

        let key = office.identifier.to_uppercase();
        if offices.insert(key, office).is_some() {
            warn!("Duplicate field office identifier in {}", path.display());
        }
    }

    debug!("Loaded {} field offices from {}", offices.len(), path.display());
    Ok(offices)
}

/// Load `code,category` rows into the event-code index
fn load_event_codes(path: &Path) -> Result<HashMap<String, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| {
            Error::station_registry(format!(
                "failed to open event codes file {}: {}",
                path.display(),
                e
            ))
        })?;

    let mut event_codes = HashMap::new();
    for result in reader.deserialize() {
        let row: EventCodeRow = result.map_err(|e| {
            Error::station_registry(format!(
                "malformed row in event codes file {}: {}",
                path.display(),
                e
            ))
        })?;
        event_codes.insert(row.code.to_uppercase(), row.category);
    }

    debug!(
        "Loaded {} event codes from {}",
        event_codes.len(),
        path.display()
    );
    Ok(event_codes)
}

/// Built-in category mapping used when no lookup file is configured
fn default_event_codes() -> HashMap<String, String> {
    let mut event_codes = HashMap::new();
    for (category, codes) in event_categories::DEFAULT_MAPPING {
        for code in *codes {
            event_codes.insert(code.to_string(), category.to_string());
        }
    }
    event_codes
}

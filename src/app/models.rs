//! Data models for PNS bulletin processing
//!
//! This module contains the core data structures for representing parsed
//! bulletin content: the canonical observation record, bulletin-level
//! metadata, the issuance timestamp used as the archival key, and the
//! two-variant bulletin format.

use crate::constants::{METADATA_MARKER, UNKNOWN_DATE, UNKNOWN_TIME};
use serde::{Deserialize, Serialize};

// =============================================================================
// Observation Record
// =============================================================================

/// One measured fact reported in a bulletin.
///
/// Field values are final at parse time; an observation is never mutated
/// after creation. Identity for deduplication is the full field tuple, not a
/// synthetic key: two rows with identical field values anywhere in the
/// ingested corpus are the same observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar date as published (source format varies, not guaranteed ISO)
    pub date: String,

    /// Free-text time of day (e.g. "1000 PM")
    pub time: String,

    /// Location hierarchy, coarsening from state to city
    pub state: String,
    pub county: String,
    pub city: String,

    /// Coordinates; absent for many alternative-format rows
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Normalized uppercase event code (e.g. `SNOW_24`, `PKGUST`);
    /// `"UNKNOWN"` when the source field is blank
    #[serde(rename = "type")]
    pub event_type: String,

    /// Measured value, if the row carried one
    pub value: Option<f64>,

    /// Unit of measurement, `"UNKNOWN"` default
    pub unit: String,

    /// Reporting source, `"UNKNOWN"` default
    pub source: String,

    /// Free-text description, `"UNKNOWN"` default
    pub description: String,
}

/// Hashable identity of an [`Observation`] for structural-equality
/// deduplication. Float fields are compared by bit pattern so that
/// `Option<f64>` can participate in hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObservationKey {
    date: String,
    time: String,
    state: String,
    county: String,
    city: String,
    latitude: Option<u64>,
    longitude: Option<u64>,
    event_type: String,
    value: Option<u64>,
    unit: String,
    source: String,
    description: String,
}

impl Observation {
    /// Identity key for deduplication by the full field tuple
    pub fn dedup_key(&self) -> ObservationKey {
        ObservationKey {
            date: self.date.clone(),
            time: self.time.clone(),
            state: self.state.clone(),
            county: self.county.clone(),
            city: self.city.clone(),
            latitude: self.latitude.map(f64::to_bits),
            longitude: self.longitude.map(f64::to_bits),
            event_type: self.event_type.clone(),
            value: self.value.map(f64::to_bits),
            unit: self.unit.clone(),
            source: self.source.clone(),
            description: self.description.clone(),
        }
    }
}

/// Drop exact-duplicate observations, keeping the first-seen instance.
///
/// Surviving rows keep their original relative order, so repeated runs over
/// the same input produce identical output.
pub fn dedupe_observations(observations: Vec<Observation>) -> Vec<Observation> {
    let mut seen = std::collections::HashSet::new();
    observations
        .into_iter()
        .filter(|obs| seen.insert(obs.dedup_key()))
        .collect()
}

// =============================================================================
// Bulletin Metadata
// =============================================================================

/// Bulletin-level metadata, one record per ingested bulletin.
///
/// Every field is independently optional: a pattern that does not match
/// leaves its field `None`. Metadata extraction never fails outright, it
/// degrades field-by-field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulletinMetadata {
    /// Product issuance code (e.g. `NOUS41 KOKX`)
    pub issuance_code: Option<String>,

    /// Affected zone ranges (e.g. `CTZ005>012-NJZ010>015`)
    pub region_codes: Option<String>,

    /// ISO date derived from the 6-digit `YYMMDD` code on the first line.
    /// Distinct from the issuance timestamp used as the archival key.
    pub timestamp: Option<String>,

    /// The literal title line containing "Public Information Statement"
    pub public_info: Option<String>,

    /// The line following the office's self-identifying line
    pub nws_office: Option<String>,

    /// A line matching the time-of-day + weekday + month + day + year pattern
    pub nws_time: Option<String>,
}

// =============================================================================
// Issuance Timestamp
// =============================================================================

/// The bulletin's self-reported publication moment, used as the archival
/// dedup/versioning key per station (e.g. "831 AM EST Mon Feb 3 2025" →
/// date `2025-02-03`, time `831AM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceTimestamp {
    /// ISO date, or `"unknown_date"`
    pub date: String,

    /// Time token with internal whitespace stripped, or `"unknown_time"`
    pub time: String,
}

impl IssuanceTimestamp {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }

    /// Sentinel timestamp for bulletins with no recognizable issuance line
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_DATE, UNKNOWN_TIME)
    }

    /// True if either component fell back to its sentinel
    pub fn is_unknown(&self) -> bool {
        self.date == UNKNOWN_DATE || self.time == UNKNOWN_TIME
    }

    /// Directory key naming this bulletin's archive artifacts.
    ///
    /// Sentinel keys can collide across genuinely different unparsable
    /// bulletins; the idempotency check then skips the later one.
    pub fn archive_key(&self) -> String {
        format!("{}_{}", self.date, self.time).replace(' ', "")
    }
}

// =============================================================================
// Bulletin Format
// =============================================================================

/// The two bulletin layouts, a closed sum type.
///
/// Classification is a binary, first-match decision with no hybrid state.
/// The normalizer may still run both extractors and merge; the classifier's
/// verdict is recorded for archival audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletinFormat {
    /// Contains a `**METADATA**` marker followed by CSV-like rows
    Structured,
    /// Whitespace-aligned table under a human-readable header
    Alternative,
}

impl BulletinFormat {
    /// Classify a bulletin by the presence of the `**METADATA**` marker
    /// anywhere in its text.
    pub fn classify(text: &str) -> Self {
        if text.contains(METADATA_MARKER) {
            BulletinFormat::Structured
        } else {
            BulletinFormat::Alternative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BulletinFormat::Structured => "structured",
            BulletinFormat::Alternative => "alternative",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_observation() -> Observation {
        Observation {
            date: "1/19/2025".to_string(),
            time: "1000 PM".to_string(),
            state: "CT".to_string(),
            county: "Fairfield".to_string(),
            city: "Stamford".to_string(),
            latitude: Some(41.02),
            longitude: Some(-73.56),
            event_type: "SNOW_24".to_string(),
            value: Some(2.0),
            unit: "Inch".to_string(),
            source: "Public".to_string(),
            description: "24 hour snowfall".to_string(),
        }
    }

    #[test]
    fn dedup_collapses_identical_rows_first_seen_wins() {
        let a = sample_observation();
        let mut b = sample_observation();
        b.city = "Norwalk".to_string();

        let out = dedupe_observations(vec![a.clone(), b.clone(), a.clone(), b.clone()]);

        assert_eq!(out, vec![a, b]);
    }

    #[test]
    fn dedup_distinguishes_optional_floats() {
        let a = sample_observation();
        let mut b = sample_observation();
        b.value = None;

        let out = dedupe_observations(vec![a, b]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn classify_finds_marker_anywhere() {
        assert_eq!(
            BulletinFormat::classify("prose\n**METADATA**\nrows"),
            BulletinFormat::Structured
        );
        assert_eq!(
            BulletinFormat::classify("trailing **METADATA**"),
            BulletinFormat::Structured
        );
        assert_eq!(
            BulletinFormat::classify("Location   Temp   Amount"),
            BulletinFormat::Alternative
        );
        // Case matters for the literal marker
        assert_eq!(
            BulletinFormat::classify("**metadata**"),
            BulletinFormat::Alternative
        );
    }

    #[test]
    fn unknown_issuance_timestamp_uses_sentinels() {
        let ts = IssuanceTimestamp::unknown();
        assert!(ts.is_unknown());
        assert_eq!(ts.archive_key(), "unknown_date_unknown_time");
    }

    #[test]
    fn archive_key_strips_spaces() {
        let ts = IssuanceTimestamp::new("2025-02-03", "831 AM");
        assert_eq!(ts.archive_key(), "2025-02-03_831AM");
    }
}

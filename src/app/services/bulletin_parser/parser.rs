//! Bulletin parsing orchestration
//!
//! [`BulletinParser`] owns the compiled extractors and turns one bulletin's
//! raw text into a [`ParsedBulletin`]. Both row extractors always run and
//! their outputs are unioned; the classifier's verdict is recorded for
//! archival audit but does not gate extraction. This is the permissive merge
//! policy, robust to malformed or missing `**METADATA**` markers.

use crate::app::models::{
    BulletinFormat, BulletinMetadata, IssuanceTimestamp, Observation, dedupe_observations,
};
use crate::app::services::bulletin_parser::alternative::{
    AlternativeRow, AlternativeTableExtractor,
};
use crate::app::services::bulletin_parser::metadata::MetadataExtractor;
use crate::app::services::bulletin_parser::stats::ParseStats;
use crate::app::services::bulletin_parser::structured::StructuredExtractor;
use crate::app::services::bulletin_parser::timestamp::TimestampExtractor;
use crate::constants::{TABLE_LOCATION_COLUMN, UNKNOWN};
use tracing::{debug, error, info};

/// Everything extracted from one bulletin. The issuance timestamp and
/// metadata ride alongside the observations, never merged into the rows.
#[derive(Debug, Clone)]
pub struct ParsedBulletin {
    /// Issuing field office identifier (partition key)
    pub station: String,

    /// Classifier verdict for this bulletin
    pub format: BulletinFormat,

    /// Archival dedup/versioning key
    pub issuance: IssuanceTimestamp,

    /// Bulletin-level metadata, fields independently optional
    pub metadata: BulletinMetadata,

    /// Verbatim lines preceding the bulletin title
    pub header_lines: Vec<String>,

    /// Deduplicated canonical observations
    pub observations: Vec<Observation>,

    /// Combined extraction statistics
    pub stats: ParseStats,
}

/// Parser for one station's bulletins
#[derive(Debug, Clone, Default)]
pub struct BulletinParser {
    timestamp: TimestampExtractor,
    structured: StructuredExtractor,
    alternative: AlternativeTableExtractor,
    metadata: MetadataExtractor,
}

impl BulletinParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one bulletin's raw text into observations plus sibling
    /// metadata.
    ///
    /// Pure over its input: no I/O, no shared state. Failures inside either
    /// extractor degrade to an empty contribution; the bulletin is still
    /// returned with whatever partial metadata exists.
    pub fn parse(&self, station: &str, raw_text: &str) -> ParsedBulletin {
        let lines: Vec<&str> = raw_text.lines().collect();

        let format = BulletinFormat::classify(raw_text);
        debug!("Bulletin for {} classified as {}", station, format.as_str());

        let issuance = self.timestamp.extract(&lines);
        let metadata = self.metadata.extract(&lines);
        let header_lines = self.metadata.header_lines(&lines);

        let mut stats = ParseStats::new();

        let structured = self.structured.extract(&lines);
        let structured_count = structured.observations.len();
        let mut observations = structured.observations;
        stats.absorb(structured.stats);

        match self.alternative.extract(station, &lines) {
            Ok(table) => {
                observations.extend(
                    table
                        .rows
                        .iter()
                        .map(|row| self.reconcile_row(row, &issuance)),
                );
                stats.absorb(table.stats);
            }
            Err(e) => {
                // Only a bulletin with no structural anchor at all is an
                // extraction error; structured bulletins routinely have no
                // table header.
                if structured_count == 0 {
                    error!("No observations extractable for {}: {}", station, e);
                    stats.errors.push(e.to_string());
                } else {
                    debug!("No alternative table for {}: {}", station, e);
                }
            }
        }

        let before = observations.len();
        let observations = dedupe_observations(observations);
        stats.duplicates_removed += before - observations.len();

        debug!(
            "Extraction for {}: {} of {} candidate lines became rows ({:.0}%)",
            station,
            stats.rows_parsed,
            stats.lines_seen,
            stats.success_rate()
        );
        info!(
            "Parsed bulletin for {}: {} observations ({} format, issued {} {})",
            station,
            observations.len(),
            format.as_str(),
            issuance.date,
            issuance.time
        );

        ParsedBulletin {
            station: station.to_string(),
            format,
            issuance,
            metadata,
            header_lines,
            observations,
            stats,
        }
    }

    /// Reconcile a generic table row into the canonical schema.
    ///
    /// The `Location` cell provides the city (and the state when it carries
    /// a trailing `, ST` component); an `Amount` cell provides value and
    /// unit; every other cell renders into the description. Coordinates are
    /// absent for these rows, and date/time come from the bulletin's
    /// issuance timestamp.
    fn reconcile_row(&self, row: &AlternativeRow, issuance: &IssuanceTimestamp) -> Observation {
        let location = row.get(TABLE_LOCATION_COLUMN).unwrap_or_default();
        let (city, state) = split_location(location);

        let (value, unit) = row
            .get("Amount")
            .map(parse_amount)
            .unwrap_or((None, UNKNOWN.to_string()));

        let description: Vec<String> = row
            .iter()
            .filter(|(column, _)| *column != TABLE_LOCATION_COLUMN && *column != "Amount")
            .map(|(column, cell)| format!("{}: {}", column, cell))
            .collect();
        let description = if description.is_empty() {
            UNKNOWN.to_string()
        } else {
            description.join("; ")
        };

        Observation {
            date: issuance.date.clone(),
            time: issuance.time.clone(),
            state,
            county: String::new(),
            city,
            latitude: None,
            longitude: None,
            event_type: UNKNOWN.to_string(),
            value,
            unit,
            source: UNKNOWN.to_string(),
            description,
        }
    }
}

/// "Stamford, CT" → ("Stamford", "CT"); a location without a short trailing
/// component stays a bare city.
fn split_location(location: &str) -> (String, String) {
    if let Some((city, state)) = location.rsplit_once(',') {
        let state = state.trim();
        if !state.is_empty() && state.len() <= 3 {
            return (city.trim().to_string(), state.to_string());
        }
    }
    (location.trim().to_string(), String::new())
}

/// "3.5 in" → (Some(3.5), "in"); unparsable amounts keep the raw text in
/// the unit position so nothing is silently dropped.
fn parse_amount(amount: &str) -> (Option<f64>, String) {
    let mut parts = amount.split_whitespace();
    let Some(first) = parts.next() else {
        return (None, UNKNOWN.to_string());
    };

    match first.parse::<f64>() {
        Ok(value) => {
            let unit = parts.collect::<Vec<_>>().join(" ");
            if unit.is_empty() {
                (Some(value), UNKNOWN.to_string())
            } else {
                (Some(value), unit)
            }
        }
        Err(_) => (None, amount.trim().to_string()),
    }
}

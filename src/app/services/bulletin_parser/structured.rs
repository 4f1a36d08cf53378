//! Structured field extraction
//!
//! Bulletins carrying a `**METADATA**` block publish observation rows as
//! comma-separated lines, each prefixed with a colon. Every line of the
//! bulletin is a candidate row; real CSV quoting applies, since location
//! names and descriptions may contain commas within quotes.

use crate::app::models::{Observation, dedupe_observations};
use crate::app::services::bulletin_parser::stats::{ExtractionResult, ParseStats};
use crate::constants::{MIN_STRUCTURED_FIELDS, UNKNOWN, structured_fields as fields};
use csv::StringRecord;
use tracing::{error, warn};

/// Extracts canonical observations from structured bulletin lines
#[derive(Debug, Clone, Default)]
pub struct StructuredExtractor;

impl StructuredExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Treat every line as a candidate CSV row and extract those with at
    /// least 14 positional fields.
    ///
    /// Shorter non-blank rows are section headers, prose, or separators and
    /// are skipped with a warning. A float-parse failure in a numeric column
    /// skips that single row with a logged error; extraction continues on
    /// subsequent lines. Exact duplicates collapse before returning.
    pub fn extract(&self, lines: &[&str]) -> ExtractionResult {
        let mut stats = ParseStats::new();
        let mut observations = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            stats.lines_seen += 1;

            // Upstream prefixes data rows with a colon
            let candidate = trimmed.strip_prefix(':').unwrap_or(trimmed);

            let record = match parse_csv_line(candidate) {
                Ok(Some(record)) => record,
                Ok(None) => {
                    stats.rows_skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!("CSV parse failure at line {}: {}", index, e);
                    stats.rows_skipped += 1;
                    stats.errors.push(format!("line {}: {}", index, e));
                    continue;
                }
            };

            if record.len() < MIN_STRUCTURED_FIELDS {
                warn!("Skipping malformed line {}: '{}'", index, candidate);
                stats.rows_skipped += 1;
                continue;
            }

            match observation_from_record(&record) {
                Ok(observation) => {
                    observations.push(observation);
                    stats.rows_parsed += 1;
                }
                Err(e) => {
                    error!("Error parsing line {}: '{}' - {}", index, candidate, e);
                    stats.rows_skipped += 1;
                    stats.errors.push(format!("line {}: {}", index, e));
                }
            }
        }

        let before = observations.len();
        let observations = dedupe_observations(observations);
        stats.duplicates_removed = before - observations.len();

        ExtractionResult {
            observations,
            stats,
        }
    }
}

/// Parse one line as a single CSV record with standard quoting rules
fn parse_csv_line(line: &str) -> Result<Option<StringRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    reader.records().next().transpose()
}

/// Map a record's positional fields onto the canonical observation schema
fn observation_from_record(record: &StringRecord) -> Result<Observation, String> {
    Ok(Observation {
        date: field(record, fields::DATE).to_string(),
        time: field(record, fields::TIME).to_string(),
        state: field(record, fields::STATE).to_string(),
        county: field(record, fields::COUNTY).to_string(),
        city: field(record, fields::CITY).to_string(),
        latitude: optional_float(record, fields::LATITUDE, "latitude")?,
        longitude: optional_float(record, fields::LONGITUDE, "longitude")?,
        event_type: uppercase_or_unknown(field(record, fields::EVENT_TYPE)),
        value: optional_float(record, fields::VALUE, "value")?,
        unit: text_or_unknown(field(record, fields::UNIT)),
        source: text_or_unknown(field(record, fields::SOURCE)),
        description: text_or_unknown(field(record, fields::DESCRIPTION)),
    })
}

/// Positional field access; out-of-range reads as empty
fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

/// Empty fields are absent values; non-empty fields must parse
fn optional_float(record: &StringRecord, index: usize, name: &str) -> Result<Option<f64>, String> {
    let raw = field(record, index);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| format!("invalid {} value '{}'", name, raw))
}

fn text_or_unknown(raw: &str) -> String {
    if raw.is_empty() {
        UNKNOWN.to_string()
    } else {
        raw.to_string()
    }
}

fn uppercase_or_unknown(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_uppercase()
    }
}

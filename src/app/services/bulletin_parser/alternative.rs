//! Alternative-format table extraction
//!
//! Bulletins without a `**METADATA**` marker publish observations as a
//! whitespace-aligned table under a human-readable header such as
//! `Location          Temp        Amount`. Columns are separated by runs of
//! two or more spaces; single spaces are legitimate inside location names
//! and column labels.

use crate::app::services::bulletin_parser::stats::ParseStats;
use crate::constants::{COUNTY_SEPARATOR_PREFIX, TABLE_LOCATION_COLUMN, TABLE_VALUE_COLUMNS};
use crate::{Error, Result};
use regex::Regex;
use tracing::{debug, warn};

/// One accepted table row: cells keyed by header tokens, in positional
/// correspondence. Not the canonical observation schema; the normalizer
/// reconciles.
#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeRow {
    columns: Vec<(String, String)>,
}

impl AlternativeRow {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self { columns }
    }

    /// Cell value under the given header token
    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value.as_str())
    }

    /// Ordered (column, cell) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_str()))
    }
}

/// A detected table: ordered column names plus accepted rows
#[derive(Debug, Clone, Default)]
pub struct AlternativeTable {
    pub columns: Vec<String>,
    pub rows: Vec<AlternativeRow>,
    pub stats: ParseStats,
}

/// Extracts the whitespace-aligned table from alternative-format bulletins
#[derive(Debug, Clone)]
pub struct AlternativeTableExtractor {
    splitter: Regex,
}

impl Default for AlternativeTableExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AlternativeTableExtractor {
    pub fn new() -> Self {
        Self {
            splitter: Regex::new(r"\s{2,}").expect("hard-coded column splitter"),
        }
    }

    /// Locate the table header and extract rows whose token count matches it.
    ///
    /// A missing header is the one hard failure mode in extraction. County
    /// separator lines (`...Fairfield County...`) and blank lines are
    /// skipped before the column-count check; a token-count mismatch skips
    /// the row with a warning. This is a strict schema with no partial-row
    /// tolerance.
    pub fn extract(&self, station: &str, lines: &[&str]) -> Result<AlternativeTable> {
        let Some(header_index) = lines.iter().position(|line| is_table_header(line)) else {
            return Err(Error::bulletin_format(
                station,
                "no table header line found (expected 'Location' with 'Temp' or 'Amount')",
            ));
        };

        let columns = self.tokenize(lines[header_index]);
        debug!("Table header at line {}: {:?}", header_index, columns);

        let mut stats = ParseStats::new();
        let mut rows = Vec::new();

        for line in &lines[header_index + 1..] {
            let trimmed = line.trim_end();
            if trimmed.trim().is_empty() || is_county_separator(trimmed) {
                continue;
            }
            stats.lines_seen += 1;

            let cells = self.tokenize(trimmed);
            if cells.len() != columns.len() {
                warn!(
                    "Skipping table row with {} tokens (expected {}): '{}'",
                    cells.len(),
                    columns.len(),
                    trimmed.trim()
                );
                stats.rows_skipped += 1;
                continue;
            }

            rows.push(AlternativeRow::new(
                columns.iter().cloned().zip(cells).collect(),
            ));
            stats.rows_parsed += 1;
        }

        Ok(AlternativeTable {
            columns,
            rows,
            stats,
        })
    }

    /// Split a line on runs of two or more whitespace characters
    fn tokenize(&self, line: &str) -> Vec<String> {
        self.splitter
            .split(line.trim())
            .filter(|token| !token.is_empty())
            .map(|token| token.to_string())
            .collect()
    }
}

/// A header line carries "Location" and at least one value column label
fn is_table_header(line: &str) -> bool {
    line.contains(TABLE_LOCATION_COLUMN)
        && TABLE_VALUE_COLUMNS.iter().any(|label| line.contains(label))
}

/// County separators look like `...Fairfield County...`
fn is_county_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with(COUNTY_SEPARATOR_PREFIX) && trimmed.contains("County")
}

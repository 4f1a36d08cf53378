//! Bulletin-level metadata extraction
//!
//! Pulls issuing-office fields out of the bulletin independent of row
//! format. Each field is matched on its own; absence of a pattern leaves
//! the field `None`, so this extraction never fails outright.

use crate::app::models::BulletinMetadata;
use crate::constants::{NWS_OFFICE_MARKER, PUBLIC_INFO_TITLE};
use chrono::NaiveDate;
use regex::Regex;
use tracing::warn;

/// Issuance code at the start of the first line, e.g. `NOUS41 KOKX`
const ISSUANCE_CODE_PATTERN: &str = r"^(NOUS\d{2}\s[A-Z]{3,4})";

/// Zone-range groups, e.g. `CTZ005>012-NJZ010>015`
const REGION_CODES_PATTERN: &str = r"([A-Z]{2}Z\d{3}>\d{3}(?:-[A-Z]{2}Z\d{3}>\d{3})*)";

/// 6-digit `YYMMDD` code on the first line
const HEADER_DATE_PATTERN: &str = r"(\d{6})";

/// Report time line: time-of-day, zone/weekday tokens, month, day, year
const NWS_TIME_PATTERN: &str = r"^\d{3,4}\s[AP]M(\s[A-Za-z]{3,4}){2,3}\s\d{1,2}\s\d{4}";

/// Extracts [`BulletinMetadata`] and the archival header-line block
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    issuance_code: Regex,
    region_codes: Regex,
    header_date: Regex,
    nws_time: Regex,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self {
            issuance_code: Regex::new(ISSUANCE_CODE_PATTERN).expect("hard-coded pattern"),
            region_codes: Regex::new(REGION_CODES_PATTERN).expect("hard-coded pattern"),
            header_date: Regex::new(HEADER_DATE_PATTERN).expect("hard-coded pattern"),
            nws_time: Regex::new(NWS_TIME_PATTERN).expect("hard-coded pattern"),
        }
    }

    /// Scan the bulletin once per metadata pattern
    pub fn extract(&self, lines: &[&str]) -> BulletinMetadata {
        let mut metadata = BulletinMetadata::default();

        if let Some(first) = lines.first() {
            metadata.issuance_code = self
                .issuance_code
                .captures(first)
                .map(|caps| caps[1].to_string());
            metadata.timestamp = self
                .header_date
                .captures(first)
                .and_then(|caps| parse_header_date(&caps[1]));
        }

        for (i, line) in lines.iter().enumerate() {
            if metadata.region_codes.is_none()
                && let Some(caps) = self.region_codes.captures(line)
            {
                metadata.region_codes = Some(caps[1].to_string());
            }
            if metadata.public_info.is_none() && line.contains(PUBLIC_INFO_TITLE) {
                metadata.public_info = Some(line.trim().to_string());
            }
            if metadata.nws_office.is_none() && line.contains(NWS_OFFICE_MARKER) {
                metadata.nws_office = lines.get(i + 1).map(|next| next.trim().to_string());
            }
            if metadata.nws_time.is_none() && self.nws_time.is_match(line.trim()) {
                metadata.nws_time = Some(line.trim().to_string());
            }
        }

        metadata
    }

    /// All lines preceding the first "Public Information Statement"
    /// occurrence, verbatim and trimmed. Kept for archival record-keeping,
    /// not parsing.
    pub fn header_lines(&self, lines: &[&str]) -> Vec<String> {
        let Some(title_index) = lines.iter().position(|line| line.contains(PUBLIC_INFO_TITLE))
        else {
            return Vec::new();
        };

        lines[..title_index]
            .iter()
            .map(|line| line.trim().to_string())
            .collect()
    }
}

/// `YYMMDD` to ISO date; malformed codes degrade to `None`
fn parse_header_date(code: &str) -> Option<String> {
    match NaiveDate::parse_from_str(code, "%y%m%d") {
        Ok(date) => Some(date.format("%Y-%m-%d").to_string()),
        Err(e) => {
            warn!("Unparsable header date code '{}': {}", code, e);
            None
        }
    }
}

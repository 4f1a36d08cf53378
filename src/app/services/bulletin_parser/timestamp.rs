//! Issuance timestamp extraction
//!
//! Locates the bulletin's self-reported publication moment from free text,
//! e.g. "831 AM EST Mon Feb 3 2025". The result keys the bulletin's archive
//! artifacts, so this extractor never fails: it degrades to sentinel values.

use crate::app::models::IssuanceTimestamp;
use crate::constants::UNKNOWN_DATE;
use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, warn};

/// Loose issuance-time pattern: 1-4 digits, optional space, AM/PM, followed
/// (possibly much later on the same line) by a three-letter month name, a
/// 1-2 digit day, and a 4-digit year.
const ISSUANCE_PATTERN: &str = r"(\d{1,4})\s?([AP]M)\b.*\b(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+(\d{1,2})\s+(\d{4})\b";

/// Extracts the issuance `(date, time)` pair from bulletin lines
#[derive(Debug, Clone)]
pub struct TimestampExtractor {
    pattern: Regex,
}

impl Default for TimestampExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampExtractor {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(ISSUANCE_PATTERN).expect("hard-coded issuance pattern"),
        }
    }

    /// Scan lines in order and extract the first issuance timestamp.
    ///
    /// The time token is normalized by stripping internal whitespace
    /// ("831 AM" becomes "831AM"). An invalid calendar date keeps the raw
    /// time token but falls back to the date sentinel; no matching line at
    /// all yields the full sentinel pair. Pure function, never errors.
    pub fn extract(&self, lines: &[&str]) -> IssuanceTimestamp {
        for line in lines {
            let Some(caps) = self.pattern.captures(line) else {
                continue;
            };

            let time = format!("{}{}", &caps[1], &caps[2]);
            let date = match parse_issuance_date(&caps[3], &caps[4], &caps[5]) {
                Some(date) => date,
                None => {
                    warn!("Unparsable issuance date in line: '{}'", line.trim());
                    UNKNOWN_DATE.to_string()
                }
            };

            debug!("Issuance timestamp: {} {}", date, time);
            return IssuanceTimestamp::new(date, time);
        }

        debug!("No issuance-time line found, using sentinel timestamp");
        IssuanceTimestamp::unknown()
    }
}

/// Month name, day, and year to ISO `YYYY-MM-DD`; `None` for dates that do
/// not exist on the calendar.
fn parse_issuance_date(month: &str, day: &str, year: &str) -> Option<String> {
    let month = month_number(month)?;
    let day: u32 = day.parse().ok()?;
    let year: i32 = year.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.format("%Y-%m-%d").to_string())
}

fn month_number(name: &str) -> Option<u32> {
    match name {
        "Jan" => Some(1),
        "Feb" => Some(2),
        "Mar" => Some(3),
        "Apr" => Some(4),
        "May" => Some(5),
        "Jun" => Some(6),
        "Jul" => Some(7),
        "Aug" => Some(8),
        "Sep" => Some(9),
        "Oct" => Some(10),
        "Nov" => Some(11),
        "Dec" => Some(12),
        _ => None,
    }
}

//! Application constants for the PNS processor
//!
//! This module contains the format markers, sentinel values, archive layout
//! names, and default mappings used throughout the application.

// =============================================================================
// Bulletin Format Markers
// =============================================================================

/// Marker that identifies a structured bulletin. Its presence anywhere in the
/// bulletin text selects the structured layout.
pub const METADATA_MARKER: &str = "**METADATA**";

/// Minimum positional field count for a structured observation row. Rows with
/// fewer fields are section headers, blank lines, or prose.
pub const MIN_STRUCTURED_FIELDS: usize = 14;

/// Column that anchors an alternative-format table header.
pub const TABLE_LOCATION_COLUMN: &str = "Location";

/// Either of these, together with the location column, completes a table
/// header line.
pub const TABLE_VALUE_COLUMNS: &[&str] = &["Temp", "Amount"];

/// Prefix of a county-separator line within an alternative-format table.
pub const COUNTY_SEPARATOR_PREFIX: &str = "...";

/// Title line present in every bulletin; everything before it is header
/// metadata.
pub const PUBLIC_INFO_TITLE: &str = "Public Information Statement";

/// Self-identifying line of the issuing office; the office name follows on
/// the next line.
pub const NWS_OFFICE_MARKER: &str = "National Weather Service";

// =============================================================================
// Sentinel Values
// =============================================================================

/// Fallback for fields the source left blank.
pub const UNKNOWN: &str = "UNKNOWN";

/// Issuance-date sentinel when no line matches the issuance-time pattern or
/// the matched date is not a valid calendar date.
pub const UNKNOWN_DATE: &str = "unknown_date";

/// Issuance-time sentinel when no line matches the issuance-time pattern.
pub const UNKNOWN_TIME: &str = "unknown_time";

// =============================================================================
// Archive Layout
// =============================================================================

/// Directory under each station holding raw bulletin text dropped by the
/// fetch collaborator.
pub const RAW_DIR_NAME: &str = "raw";

/// Directory under each station holding parsed per-bulletin tables.
pub const PARSED_REPORTS_DIR_NAME: &str = "parsed_reports";

/// Directory holding the cumulative master table across all stations.
pub const ALL_STATIONS_DIR_NAME: &str = "ALL_STATIONS";

/// File name of the cumulative master table.
pub const MASTER_FILE_NAME: &str = "all_stations_all_dates.csv";

/// Per-bulletin table file names.
pub const OBSERVATIONS_FILE_NAME: &str = "observations.csv";
pub const METADATA_FILE_NAME: &str = "metadata.csv";
pub const HEADER_METADATA_FILE_NAME: &str = "header_metadata.csv";

/// Grouped-view directory names within a bulletin's parsed output.
pub const REGIONS_DIR_NAME: &str = "regions";
pub const EVENTS_DIR_NAME: &str = "events";

/// Canonical observation column order for every observations table.
pub const OBSERVATION_COLUMNS: &[&str] = &[
    "date",
    "time",
    "state",
    "county",
    "city",
    "latitude",
    "longitude",
    "type",
    "value",
    "unit",
    "source",
    "description",
];

/// Station column prepended to observation rows in the master table.
pub const MASTER_STATION_COLUMN: &str = "station";

// =============================================================================
// Event Categories
// =============================================================================

/// Default event-code to category mapping, used when no event-code lookup
/// file is configured. Codes not listed fall into [`event_categories::OTHER`].
pub mod event_categories {
    pub const WINTER: &str = "Winter";
    pub const WIND: &str = "Wind";
    pub const FLOODING: &str = "Flooding";
    pub const TEMPS: &str = "Temps";
    pub const OTHER: &str = "Other";

    /// (category, member event codes)
    pub const DEFAULT_MAPPING: &[(&str, &[&str])] = &[
        (WINTER, &["SNOW", "SNOW_24"]),
        (WIND, &["PKGUST"]),
        (FLOODING, &["FLOOD"]),
        (TEMPS, &["COLD", "HEAT", "TEMP"]),
    ];
}

// =============================================================================
// Structured Row Field Indices
// =============================================================================

/// Positional field indices of a structured observation row. Indices 5 and 6
/// are unused filler columns in the upstream product.
pub mod structured_fields {
    pub const DATE: usize = 0;
    pub const TIME: usize = 1;
    pub const STATE: usize = 2;
    pub const COUNTY: usize = 3;
    pub const CITY: usize = 4;
    pub const LATITUDE: usize = 7;
    pub const LONGITUDE: usize = 8;
    pub const EVENT_TYPE: usize = 9;
    pub const VALUE: usize = 10;
    pub const UNIT: usize = 11;
    pub const SOURCE: usize = 12;
    pub const DESCRIPTION: usize = 13;
}

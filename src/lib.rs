//! PNS Processor Library
//!
//! A Rust library for converting National Weather Service Public Information
//! Statements (PNS bulletins) from free text into structured observation
//! archives.
//!
//! This library provides tools for:
//! - Classifying bulletins into the structured (`**METADATA**`) and
//!   alternative (whitespace-table) layouts
//! - Extracting observation rows from either layout into a common schema
//! - Extracting bulletin-level metadata and issuance timestamps
//! - Deduplicating observations by structural equality
//! - Writing idempotent per-bulletin CSV archives keyed by station and
//!   issuance timestamp
//! - Accumulating all per-station archives into one master table

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod accumulator;
        pub mod archive_writer;
        pub mod bulletin_parser;
        pub mod station_registry;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{BulletinFormat, BulletinMetadata, IssuanceTimestamp, Observation};
pub use config::Config;

/// Result type alias for the PNS processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for PNS bulletin processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing or writing error
    #[error("CSV error: {message}")]
    Csv {
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Bulletin format error (missing structural anchor)
    #[error("Bulletin format error for station '{station}': {message}")]
    BulletinFormat { station: String, message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Station registry error
    #[error("Station registry error: {message}")]
    StationRegistry { message: String },

    /// Missing input artifact for a station cycle
    #[error("Missing input for station '{station}': {path}")]
    MissingInput { station: String, path: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV error with context
    pub fn csv(message: impl Into<String>, source: Option<csv::Error>) -> Self {
        Self::Csv {
            message: message.into(),
            source,
        }
    }

    /// Create a bulletin format error
    pub fn bulletin_format(station: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BulletinFormat {
            station: station.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a station registry error
    pub fn station_registry(message: impl Into<String>) -> Self {
        Self::StationRegistry {
            message: message.into(),
        }
    }

    /// Create a missing input error
    pub fn missing_input(station: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MissingInput {
            station: station.into(),
            path: path.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::Csv {
            message: "CSV processing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}

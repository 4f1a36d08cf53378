//! Parser for PNS bulletin text
//!
//! This module turns the raw text of one Public Information Statement into a
//! [`ParsedBulletin`]: canonical observation rows, bulletin-level metadata,
//! and the issuance timestamp that keys the archive.
//!
//! ## Architecture
//!
//! - [`parser`] - Orchestration: classify, extract, reconcile, deduplicate
//! - [`timestamp`] - Issuance date/time extraction with sentinel fallback
//! - [`structured`] - CSV-row extraction for `**METADATA**` bulletins
//! - [`alternative`] - Whitespace-table extraction for free-form bulletins
//! - [`metadata`] - Bulletin-level metadata and header-line capture
//! - [`stats`] - Extraction statistics and result structures

pub mod alternative;
pub mod metadata;
pub mod parser;
pub mod stats;
pub mod structured;
pub mod timestamp;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use alternative::{AlternativeRow, AlternativeTableExtractor};
pub use metadata::MetadataExtractor;
pub use parser::{BulletinParser, ParsedBulletin};
pub use stats::{ExtractionResult, ParseStats};
pub use structured::StructuredExtractor;
pub use timestamp::TimestampExtractor;

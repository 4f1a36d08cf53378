//! Extraction statistics and result structures
//!
//! These types track how many candidate lines each extractor saw, how many
//! became observations, and what was skipped, for the run-level audit log.

use crate::app::models::Observation;

/// Result of one extraction pass with its statistics
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Successfully extracted observation records
    pub observations: Vec<Observation>,

    /// Extraction statistics
    pub stats: ParseStats,
}

/// Line-level extraction statistics
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ParseStats {
    /// Candidate lines examined
    pub lines_seen: usize,

    /// Rows successfully turned into observations
    pub rows_parsed: usize,

    /// Rows skipped (short rows, column-count mismatches, unparsable fields)
    pub rows_skipped: usize,

    /// Exact duplicates collapsed after extraction
    pub duplicates_removed: usize,

    /// Row-level problems, for post-hoc audit
    pub errors: Vec<String>,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another extractor's statistics into this one
    pub fn absorb(&mut self, other: ParseStats) {
        self.lines_seen += other.lines_seen;
        self.rows_parsed += other.rows_parsed;
        self.rows_skipped += other.rows_skipped;
        self.duplicates_removed += other.duplicates_removed;
        self.errors.extend(other.errors);
    }

    /// Share of examined lines that produced an observation
    pub fn success_rate(&self) -> f64 {
        if self.lines_seen == 0 {
            0.0
        } else {
            (self.rows_parsed as f64 / self.lines_seen as f64) * 100.0
        }
    }
}

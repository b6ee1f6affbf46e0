//! # Ingestion Module
//!
//! Loads a sentence-per-row CSV corpus into the store.
//!
//! ## Components
//!
//! * `line_parser` - Splits a raw line into fields, honoring quoted commas
//! * `row_mapper` - Validates fields and converts them into a typed row
//! * `grouping` - Concurrent map from grouping key to parent document
//! * `batch_writer` - Buffers sentences and writes them in bulk
//! * `pipeline` - Orchestrates a full refresh over a bounded worker pool
//!
//! ## Architecture
//!
//! A refresh follows these steps:
//! 1. Open the source (a missing file fails before anything is touched)
//! 2. Purge all documents and sentences
//! 3. Stream lines in chunks to semaphore-gated workers
//! 4. Each worker parses, maps, groups and buffers its rows
//! 5. Flush the remaining sentences, then write every document once

pub mod batch_writer;
pub mod grouping;
pub mod line_parser;
pub mod pipeline;
pub mod row_mapper;

// Public re-exports
pub use batch_writer::BatchWriter;
pub use grouping::{DocumentSlot, GroupingStore};
pub use line_parser::parse_line;
pub use pipeline::IngestionPipeline;
pub use row_mapper::{decode_tokens, map_row, RowRejection, COLUMN_COUNT};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a single refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestionState {
    Idle,
    Purging,
    Streaming,
    Draining,
    Complete,
    Failed,
}

impl IngestionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for IngestionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Purging => "purging",
            Self::Streaming => "streaming",
            Self::Draining => "draining",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionStats {
    /// Documents written
    pub documents_created: usize,
    /// Sentence records written
    pub sentences_persisted: u64,
    /// Data rows read, header excluded
    pub rows_read: u64,
    /// Rows dropped for too few columns or bad integers
    pub rows_skipped: u64,
    /// Sentence batches written
    pub batches_written: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl Default for IngestionStats {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            documents_created: 0,
            sentences_persisted: 0,
            rows_read: 0,
            rows_skipped: 0,
            batches_written: 0,
            started_at: now,
            finished_at: now,
            elapsed_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests;

//! # Corpus Loader Library
//!
//! Loads a sentence-per-row CSV corpus into a sled-backed store with two
//! collections: documents (one per source text) and sentences (each
//! referencing its document by id).
//!
//! ## Core Components
//!
//! * `ingestion` - Line parsing, row mapping, grouping, batched writes and the
//!   refresh pipeline
//! * `db_operations` - sled trees and the `CorpusStore` seam
//! * `service` - `CorpusService`, the API used by surrounding application code
//! * `model` - Stored entities and the grouping key
//! * `config` - Storage location, default source and ingestion tunables
//! * `logging` - Feature-scoped logging on top of `env_logger`
//! * `error` - Error types and handling
//!
//! ## Architecture
//!
//! Every refresh is destructive and full: both collections are purged, the
//! source is streamed through a bounded pool of workers, sentences are written
//! in batches as they fill up, and documents are written once at the end with
//! their final sentence counts. The two collections are not updated in one
//! transaction.

pub mod config;
pub mod db_operations;
pub mod error;
pub mod ingestion;
pub mod logging;
pub mod model;
pub mod service;

// Re-export main types for convenience
pub use config::{load_config, CorpusConfig, IngestionSettings};
pub use db_operations::{CorpusStore, DbOperations};
pub use error::{CorpusError, CorpusResult};
pub use ingestion::{IngestionPipeline, IngestionState, IngestionStats};
pub use model::{Document, GroupingKey, SentenceRecord};
pub use service::CorpusService;

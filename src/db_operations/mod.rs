// Core database operations
pub mod core;
pub mod error_utils;
mod document_operations;
mod sentence_operations;
pub mod store;


// Re-export the main DbOperations struct, the store seam and error utilities
pub use core::{DbOperations, DOCUMENTS_TREE, SENTENCES_TREE};
pub use error_utils::ErrorUtils;
pub use sentence_operations::sentence_key;
pub use store::CorpusStore;

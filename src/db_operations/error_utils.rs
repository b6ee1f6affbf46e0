//! Error handling utilities for database operations
//!
//! Keeps the messages produced by the storage layer consistently formatted.

use crate::error::CorpusError;

/// Utility functions for common error handling patterns in database operations
pub struct ErrorUtils;

impl ErrorUtils {
    /// Creates a deserialization error with consistent formatting
    pub fn deserialization_error(context: &str, error: serde_json::Error) -> CorpusError {
        CorpusError::Database(format!("Deserialization failed for {}: {}", context, error))
    }

    /// Creates a database operation error with consistent formatting
    pub fn database_error(operation: &str, error: sled::Error) -> CorpusError {
        CorpusError::Database(format!("Database {} failed: {}", operation, error))
    }

    /// Creates a tree operation error with consistent formatting
    pub fn tree_error(operation: &str, tree_name: &str, error: sled::Error) -> CorpusError {
        CorpusError::Database(format!(
            "Tree {} operation on '{}' failed: {}",
            operation, tree_name, error
        ))
    }

    /// Creates a bulk write error. Bulk write failures abort an ingestion run.
    pub fn write_error(tree_name: &str, count: usize, error: sled::Error) -> CorpusError {
        CorpusError::WriteFailure(format!(
            "Bulk write of {} entries into '{}' failed: {}",
            count, tree_name, error
        ))
    }

    /// Creates a lock acquisition error with consistent formatting
    pub fn lock_error(resource: &str) -> CorpusError {
        CorpusError::Internal(format!("Failed to acquire lock for {}", resource))
    }

    /// Helper for converting sled errors in database operations
    pub fn from_sled_error(operation: &str) -> impl Fn(sled::Error) -> CorpusError + '_ {
        move |e| Self::database_error(operation, e)
    }

    /// Helper for converting deserialization errors
    pub fn from_deserialization_error(
        context: &str,
    ) -> impl Fn(serde_json::Error) -> CorpusError + '_ {
        move |e| Self::deserialization_error(context, e)
    }
}

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for the corpus loader.
///
/// Row-level problems never show up here: malformed rows are absorbed by the
/// ingestion pipeline and reported as a skip count in
/// [`IngestionStats`](crate::ingestion::IngestionStats). Every variant below is
/// fatal to the operation that produced it.
#[derive(Error, Debug)]
pub enum CorpusError {
    /// The ingestion source does not exist. Raised before any store mutation.
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),

    /// A bulk write was rejected by the store. Batches committed before the
    /// failure stay persisted.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// Errors raised by the store outside of bulk writes (purge, reads)
    #[error("Database error: {0}")]
    Database(String),

    /// IO errors while reading the source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization of stored records
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker panics, poisoned locks and other broken internal invariants
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CorpusError {
    /// Create a new write failure
    pub fn write_failure(msg: impl Into<String>) -> Self {
        Self::WriteFailure(msg.into())
    }

    /// Create a new database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error was caused by a rejected bulk write
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Self::WriteFailure(_))
    }
}

/// Conversion from sled::Error to CorpusError
impl From<sled::Error> for CorpusError {
    fn from(error: sled::Error) -> Self {
        CorpusError::Database(error.to_string())
    }
}

/// Conversion from the configuration loader's error type
impl From<crate::config::ConfigError> for CorpusError {
    fn from(error: crate::config::ConfigError) -> Self {
        CorpusError::Config(error.to_string())
    }
}

/// Result type alias for operations that can result in a CorpusError
pub type CorpusResult<T> = Result<T, CorpusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sled_error_maps_to_database() {
        let err: CorpusError = sled::Error::Unsupported("nope".to_string()).into();
        assert!(matches!(err, CorpusError::Database(_)));
        assert!(!err.is_write_failure());
    }

    #[test]
    fn test_display_messages() {
        let err = CorpusError::SourceNotFound(PathBuf::from("missing.csv"));
        assert_eq!(err.to_string(), "Source file not found: missing.csv");

        let err = CorpusError::write_failure("batch rejected");
        assert_eq!(err.to_string(), "Write failure: batch rejected");
        assert!(err.is_write_failure());
    }
}

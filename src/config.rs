//! Configuration for the corpus loader
//!
//! Configuration is read from a JSON file (see [`load_config`]) and then
//! overridden by `CORPUS_*` environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/corpus_config.json";

/// Default ingestion source
pub const DEFAULT_SOURCE_PATH: &str = "philosophy_data.csv";

/// Upper bound on workers, as a multiple of available parallelism
pub const MAX_WORKERS_PER_CORE: usize = 4;

/// Top-level configuration for a corpus store instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusConfig {
    /// Directory where the sled database lives
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// CSV file used by `refresh` when no explicit source is given
    #[serde(default = "default_source_path")]
    pub source_path: PathBuf,
    /// Tunables for the ingestion pipeline
    #[serde(default)]
    pub ingestion: IngestionSettings,
}

/// Performance tunables for the ingestion pipeline. None of these affect
/// correctness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestionSettings {
    /// Number of concurrent worker tasks
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Source lines handed to a worker task at a time
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Sentence records per bulk write
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data")
}

fn default_source_path() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCE_PATH)
}

fn default_worker_count() -> usize {
    available_parallelism()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_batch_size() -> usize {
    15000
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            source_path: default_source_path(),
            ingestion: IngestionSettings::default(),
        }
    }
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            chunk_size: default_chunk_size(),
            batch_size: default_batch_size(),
        }
    }
}

impl CorpusConfig {
    /// Create a new configuration with the specified storage path
    pub fn new(storage_path: PathBuf) -> Self {
        Self {
            storage_path,
            ..Default::default()
        }
    }

    /// Set the default ingestion source
    pub fn with_source_path(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = source_path.into();
        self
    }

    /// Replace the ingestion tunables
    pub fn with_ingestion(mut self, ingestion: IngestionSettings) -> Self {
        self.ingestion = ingestion;
        self
    }

    /// Apply `CORPUS_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("CORPUS_STORAGE_PATH") {
            self.storage_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("CORPUS_SOURCE_PATH") {
            self.source_path = PathBuf::from(path);
        }
        if let Some(value) = lookup("CORPUS_WORKER_COUNT") {
            self.ingestion.worker_count = parse_usize("CORPUS_WORKER_COUNT", &value)?;
        }
        if let Some(value) = lookup("CORPUS_CHUNK_SIZE") {
            self.ingestion.chunk_size = parse_usize("CORPUS_CHUNK_SIZE", &value)?;
        }
        if let Some(value) = lookup("CORPUS_BATCH_SIZE") {
            self.ingestion.batch_size = parse_usize("CORPUS_BATCH_SIZE", &value)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage_path".to_string(),
                message: "Storage path is required".to_string(),
            });
        }
        self.ingestion.validate()
    }
}

impl IngestionSettings {
    /// Validate the tunables
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("worker_count", self.worker_count),
            ("chunk_size", self.chunk_size),
            ("batch_size", self.batch_size),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "Must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Worker count clamped to `[1, MAX_WORKERS_PER_CORE * parallelism]`
    pub fn effective_worker_count(&self) -> usize {
        let cap = available_parallelism() * MAX_WORKERS_PER_CORE;
        self.worker_count.clamp(1, cap)
    }
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            field: key.to_string(),
            message: format!("'{}' is not a non-negative integer", value),
        })
}

/// Load the configuration.
///
/// The path is taken from the argument, then `CORPUS_CONFIG`, then
/// [`DEFAULT_CONFIG_PATH`]. A missing file yields the defaults; a file that
/// exists but does not parse is an error. Environment overrides are applied
/// last and the result is validated.
pub fn load_config(path: Option<&str>) -> Result<CorpusConfig, ConfigError> {
    let config_path = path
        .map(|p| p.to_string())
        .or_else(|| env::var("CORPUS_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let mut config = load_config_file(Path::new(&config_path))?;
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<CorpusConfig, ConfigError> {
    if !path.exists() {
        log::debug!(
            "Config file {} not found, using defaults",
            path.display()
        );
        return Ok(CorpusConfig::default());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        log::error!("Failed to parse corpus configuration: {}", e);
        ConfigError::Parse(e.to_string())
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

//! # Logging System
//!
//! Wires the `log` facade to `env_logger`, driven by a [`LogConfig`]. Each
//! component logs under a feature target (see [`features::LogFeature`]) whose
//! level can be tuned independently.

pub mod config;
pub mod features;

use config::{level_filter, LogConfig};
use env_logger::fmt::TimestampPrecision;
use env_logger::WriteStyle;
use features::LogFeature;
use once_cell::sync::OnceCell;

/// Global logging configuration instance
static LOGGING_CONFIG: OnceCell<LogConfig> = OnceCell::new();

/// Process-wide logger setup
pub struct LoggingSystem;

impl LoggingSystem {
    /// Initialize the logging system with default configuration plus
    /// environment overrides
    pub fn init_default() -> Result<(), LoggingError> {
        let config = LogConfig::from_env()?;
        Self::init_with_config(config)
    }

    /// Initialize the logging system with a custom configuration
    pub fn init_with_config(config: LogConfig) -> Result<(), LoggingError> {
        config.validate()?;

        let mut builder = env_logger::Builder::new();
        builder.filter_level(level_filter(&config.general.default_level));
        for (name, level) in &config.features {
            if let Some(feature) = LogFeature::from_name(name) {
                builder.filter_module(feature.target(), level_filter(level));
            }
        }
        builder.write_style(if config.general.enable_colors {
            WriteStyle::Auto
        } else {
            WriteStyle::Never
        });
        builder.format_timestamp(
            config
                .general
                .include_timestamp
                .then_some(TimestampPrecision::Millis),
        );
        builder.format_target(config.general.include_module);

        LOGGING_CONFIG
            .set(config)
            .map_err(|_| LoggingError::AlreadyInitialized)?;

        builder
            .try_init()
            .map_err(|e| LoggingError::Config(format!("Failed to install logger: {}", e)))
    }
}

/// Logging system errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logging system already initialized")]
    AlreadyInitialized,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Config error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

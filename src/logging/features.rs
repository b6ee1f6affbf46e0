//! Feature-specific logging macros and utilities
//!
//! Each component logs under its own target so levels can be tuned per
//! feature through [`LogConfig::features`](super::config::LogConfig).

/// Feature categories for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFeature {
    Ingestion,
    Database,
    Grouping,
    Batch,
    Cli,
}

impl LogFeature {
    /// All features, in declaration order
    pub const ALL: [LogFeature; 5] = [
        LogFeature::Ingestion,
        LogFeature::Database,
        LogFeature::Grouping,
        LogFeature::Batch,
        LogFeature::Cli,
    ];

    /// Get the target string for this feature
    pub fn target(&self) -> &'static str {
        match self {
            LogFeature::Ingestion => "corpus_loader::ingestion",
            LogFeature::Database => "corpus_loader::database",
            LogFeature::Grouping => "corpus_loader::grouping",
            LogFeature::Batch => "corpus_loader::batch",
            LogFeature::Cli => "corpus_loader::cli",
        }
    }

    /// Name used as key in the feature level map
    pub fn name(&self) -> &'static str {
        match self {
            LogFeature::Ingestion => "ingestion",
            LogFeature::Database => "database",
            LogFeature::Grouping => "grouping",
            LogFeature::Batch => "batch",
            LogFeature::Cli => "cli",
        }
    }

    /// Look a feature up by its config name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

// Ingestion-specific logging macros
#[macro_export]
macro_rules! log_ingestion_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "corpus_loader::ingestion", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_ingestion_info {
    ($($arg:tt)*) => {
        log::info!(target: "corpus_loader::ingestion", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_ingestion_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "corpus_loader::ingestion", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_ingestion_error {
    ($($arg:tt)*) => {
        log::error!(target: "corpus_loader::ingestion", $($arg)*)
    };
}

// Database-specific logging macros
#[macro_export]
macro_rules! log_database_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "corpus_loader::database", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_database_info {
    ($($arg:tt)*) => {
        log::info!(target: "corpus_loader::database", $($arg)*)
    };
}

// Grouping-specific logging macros
#[macro_export]
macro_rules! log_grouping_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "corpus_loader::grouping", $($arg)*)
    };
}

// Batch-writer-specific logging macros
#[macro_export]
macro_rules! log_batch_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "corpus_loader::batch", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_batch_error {
    ($($arg:tt)*) => {
        log::error!(target: "corpus_loader::batch", $($arg)*)
    };
}

// CLI-specific logging macros
#[macro_export]
macro_rules! log_cli_info {
    ($($arg:tt)*) => {
        log::info!(target: "corpus_loader::cli", $($arg)*)
    };
}

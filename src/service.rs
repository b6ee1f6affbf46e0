//! Core-facing API used by surrounding application code.

use crate::config::CorpusConfig;
use crate::db_operations::{CorpusStore, DbOperations};
use crate::error::CorpusResult;
use crate::ingestion::{IngestionPipeline, IngestionState, IngestionStats};
use crate::model::{Document, SentenceRecord};
use crate::log_ingestion_info;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

/// Entry point for refreshing and reading the corpus store.
///
/// Refreshes on one service are serialized, so the store never holds data
/// from two refreshes at once. Reads never write: an empty store stays empty
/// until someone calls [`refresh_data`](Self::refresh_data) or
/// [`initialize_data`](Self::initialize_data).
pub struct CorpusService {
    store: Arc<dyn CorpusStore>,
    config: CorpusConfig,
    refresh_lock: Mutex<()>,
    last_state: RwLock<Option<IngestionState>>,
}

impl CorpusService {
    /// Open the sled store at `config.storage_path`
    pub fn open(config: CorpusConfig) -> CorpusResult<Self> {
        config.validate()?;
        let db_ops = DbOperations::open(&config.storage_path)?;
        Ok(Self::with_store(Arc::new(db_ops), config))
    }

    /// Use an already constructed store
    pub fn with_store(store: Arc<dyn CorpusStore>, config: CorpusConfig) -> Self {
        Self {
            store,
            config,
            refresh_lock: Mutex::new(()),
            last_state: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    /// Purge the store and reload it from `source`
    pub async fn refresh_data<P: AsRef<Path>>(&self, source: P) -> CorpusResult<IngestionStats> {
        let _guard = self.refresh_lock.lock().await;
        self.run_pipeline(source.as_ref()).await
    }

    /// Refresh from the configured default source
    pub async fn refresh_from_default_source(&self) -> CorpusResult<IngestionStats> {
        let source = self.config.source_path.clone();
        self.refresh_data(source).await
    }

    /// Load the configured source only if the store is empty.
    ///
    /// Returns `Some(stats)` when a load happened.
    pub async fn initialize_data(&self) -> CorpusResult<Option<IngestionStats>> {
        let _guard = self.refresh_lock.lock().await;
        if self.store.has_data()? {
            return Ok(None);
        }
        log_ingestion_info!("Store is empty, loading {}", self.config.source_path.display());
        let source = self.config.source_path.clone();
        self.run_pipeline(&source).await.map(Some)
    }

    async fn run_pipeline(&self, source: &Path) -> CorpusResult<IngestionStats> {
        let pipeline =
            IngestionPipeline::new(Arc::clone(&self.store), self.config.ingestion.clone());
        let result = pipeline.run(source).await;
        if let Ok(mut last) = self.last_state.write() {
            *last = Some(pipeline.state());
        }
        result
    }

    /// Final state of the most recent refresh, if any ran
    pub fn last_ingestion_state(&self) -> Option<IngestionState> {
        self.last_state.read().ok().and_then(|s| *s)
    }

    /// Cheap check whether anything is stored
    pub fn has_data(&self) -> CorpusResult<bool> {
        self.store.has_data()
    }

    pub fn get_all_documents(&self) -> CorpusResult<Vec<Document>> {
        self.store.all_documents()
    }

    /// `Ok(None)` for an unknown id
    pub fn get_document_by_id(&self, id: &str) -> CorpusResult<Option<Document>> {
        self.store.document_by_id(id)
    }

    pub fn get_sentences_by_document_id(&self, id: &str) -> CorpusResult<Vec<SentenceRecord>> {
        self.store.sentences_by_document_id(id)
    }

    /// Entry count per collection
    pub fn entry_counts(&self) -> CorpusResult<HashMap<String, u64>> {
        self.store.entry_counts()
    }
}

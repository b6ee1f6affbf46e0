//! Shared fixtures for the integration tests: temporary stores, CSV sources
//! and a store that rejects writes on demand.

#![allow(dead_code)]

use corpus_loader::{
    CorpusConfig, CorpusError, CorpusResult, CorpusService, CorpusStore, DbOperations, Document,
    IngestionSettings, SentenceRecord,
};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub const HEADER: &str = "title,author,school,sentence_spacy,sentence_str,original_publication_date,corpus_edition_date,sentence_length,sentence_lowered,tokenized_txt,lemmatized_str";

/// One well-formed source row
pub fn csv_row(title: &str, author: &str, school: &str, n: usize) -> String {
    format!(
        "{},{},{},\"Sentence {n}, tagged.\",\"Sentence {n}, raw.\",1781,1998,19,\"sentence {n}, raw.\",\"['sentence', '{n}', 'raw']\",sentence {n} raw",
        title,
        author,
        school,
        n = n
    )
}

/// Header plus two Kant rows and one Hume row
pub fn kant_hume_rows() -> Vec<String> {
    vec![
        csv_row("Critique", "Kant", "Immanuel", 1),
        csv_row("Treatise", "Hume", "Empiricism", 2),
        csv_row("Critique", "Kant", "Immanuel", 3),
    ]
}

pub fn small_settings() -> IngestionSettings {
    IngestionSettings {
        worker_count: 4,
        chunk_size: 2,
        batch_size: 2,
    }
}

/// Temporary database, source file location and a service over both
pub struct TestFixture {
    pub service: CorpusService,
    pub db_ops: Arc<DbOperations>,
    pub source: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db = sled::Config::new()
            .path(temp_dir.path().join("db"))
            .temporary(true)
            .open()
            .expect("Failed to open temporary database");
        let db_ops = Arc::new(DbOperations::new(db).expect("Failed to create DbOperations"));

        let source = temp_dir.path().join("philosophy_data.csv");
        let config = CorpusConfig::new(temp_dir.path().join("db"))
            .with_source_path(&source)
            .with_ingestion(small_settings());
        let service = CorpusService::with_store(db_ops.clone(), config);

        Self {
            service,
            db_ops,
            source,
            _temp_dir: temp_dir,
        }
    }

    /// Write header plus `rows` to the fixture's source path
    pub fn write_source(&self, rows: &[String]) {
        let mut content = String::from(HEADER);
        content.push('\n');
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        fs::write(&self.source, content).expect("Failed to write source");
    }
}

/// Delegates to sled but rejects sentence batches from the `reject_from`-th
/// call on.
pub struct RejectingStore {
    pub inner: DbOperations,
    pub sentence_calls: AtomicUsize,
    pub reject_from: usize,
}

impl RejectingStore {
    pub fn new(reject_from: usize) -> Self {
        Self {
            inner: DbOperations::temporary().expect("Failed to open temporary database"),
            sentence_calls: AtomicUsize::new(0),
            reject_from,
        }
    }
}

impl CorpusStore for RejectingStore {
    fn purge(&self) -> CorpusResult<()> {
        self.inner.purge()
    }
    fn write_documents(&self, documents: &[Document]) -> CorpusResult<usize> {
        self.inner.write_documents(documents)
    }
    fn write_sentences(&self, sentences: &[SentenceRecord]) -> CorpusResult<usize> {
        let call = self.sentence_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.reject_from {
            return Err(CorpusError::write_failure("store unreachable"));
        }
        self.inner.write_sentences(sentences)
    }
    fn has_data(&self) -> CorpusResult<bool> {
        self.inner.has_data()
    }
    fn all_documents(&self) -> CorpusResult<Vec<Document>> {
        self.inner.all_documents()
    }
    fn document_by_id(&self, id: &str) -> CorpusResult<Option<Document>> {
        self.inner.document_by_id(id)
    }
    fn sentences_by_document_id(&self, id: &str) -> CorpusResult<Vec<SentenceRecord>> {
        self.inner.sentences_by_document_id(id)
    }
    fn entry_counts(&self) -> CorpusResult<HashMap<String, u64>> {
        self.inner.entry_counts()
    }
}

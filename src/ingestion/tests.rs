use super::*;
use crate::config::IngestionSettings;
use crate::db_operations::{CorpusStore, DbOperations};
use crate::error::{CorpusError, CorpusResult};
use crate::model::{Document, SentenceRecord};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::NamedTempFile;

const HEADER: &str = "title,author,school,sentence_spacy,sentence_str,original_publication_date,corpus_edition_date,sentence_length,sentence_lowered,tokenized_txt,lemmatized_str";

fn csv_row(title: &str, author: &str, school: &str, n: usize) -> String {
    format!(
        "{t},{a},{s},\"Sentence {n}, tagged.\",\"Sentence {n}, raw.\",1781,1998,19,\"sentence {n}, raw.\",\"['sentence', '{n}', 'raw']\",sentence {n} raw",
        t = title,
        a = author,
        s = school,
        n = n
    )
}

fn write_source(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

fn settings(workers: usize, chunk: usize, batch: usize) -> IngestionSettings {
    IngestionSettings {
        worker_count: workers,
        chunk_size: chunk,
        batch_size: batch,
    }
}

fn temp_store() -> Arc<DbOperations> {
    Arc::new(DbOperations::temporary().unwrap())
}

async fn run(store: Arc<DbOperations>, source: &Path, settings: IngestionSettings) -> CorpusResult<IngestionStats> {
    IngestionPipeline::new(store, settings).run(source).await
}

/// Delegates to sled but rejects every sentence batch from the n-th on.
struct RejectingStore {
    inner: DbOperations,
    sentence_calls: AtomicUsize,
    reject_from: usize,
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
            return Err(CorpusError::write_failure("batch rejected"));
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

/// Panics on every sentence write and counts how often it was called.
struct PanickingStore {
    inner: DbOperations,
    sentence_calls: AtomicUsize,
}

impl CorpusStore for PanickingStore {
    fn purge(&self) -> CorpusResult<()> {
        self.inner.purge()
    }
    fn write_documents(&self, documents: &[Document]) -> CorpusResult<usize> {
        self.inner.write_documents(documents)
    }
    fn write_sentences(&self, _sentences: &[SentenceRecord]) -> CorpusResult<usize> {
        self.sentence_calls.fetch_add(1, Ordering::SeqCst);
        panic!("sentence store crashed");
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

#[tokio::test]
async fn test_two_keys_three_rows() {
    let source = write_source(&[
        csv_row("Critique", "Kant", "German Idealism", 1),
        csv_row("Treatise", "Hume", "Empiricism", 2),
        csv_row("Critique", "Kant", "German Idealism", 3),
    ]);
    let store = temp_store();

    let stats = run(store.clone(), source.path(), settings(2, 1, 100)).await.unwrap();
    assert_eq!(stats.documents_created, 2);
    assert_eq!(stats.sentences_persisted, 3);
    assert_eq!(stats.rows_read, 3);
    assert_eq!(stats.rows_skipped, 0);

    let mut documents = store.all_documents().unwrap();
    documents.sort_by(|a, b| a.author.cmp(&b.author));
    assert_eq!(documents.len(), 2);
    let (hume, kant) = (&documents[0], &documents[1]);
    assert_eq!(kant.sentence_count, 2);
    assert_eq!(kant.title, "Critique");
    assert_eq!(hume.sentence_count, 1);

    let kant_sentences = store.sentences_by_document_id(&kant.id).unwrap();
    assert_eq!(kant_sentences.len(), 2);
    assert!(kant_sentences.iter().all(|s| s.document_id == kant.id));
    let hume_sentences = store.sentences_by_document_id(&hume.id).unwrap();
    assert_eq!(hume_sentences.len(), 1);
    assert_eq!(hume_sentences[0].sentence, "Sentence 2, raw.");
    assert_eq!(hume_sentences[0].sentence_tagged, "Sentence 2, tagged.");
    assert_eq!(hume_sentences[0].tokenized_text, vec!["sentence", "2", "raw"]);
}

#[tokio::test]
async fn test_bad_rows_are_skipped_and_counted() {
    let mut bad_year = csv_row("Critique", "Kant", "German Idealism", 2);
    bad_year = bad_year.replacen("1781", "circa 1781", 1);
    let bad_tokens = csv_row("Critique", "Kant", "German Idealism", 3)
        .replace("\"['sentence', '3', 'raw']\"", "not-a-list");

    let source = write_source(&[
        csv_row("Critique", "Kant", "German Idealism", 1),
        "too,few,columns".to_string(),
        bad_year,
        bad_tokens,
        csv_row("Only", "Skipped", "Rows", 4).replacen(",19,", ",nineteen,", 1),
    ]);
    let store = temp_store();

    let stats = run(store.clone(), source.path(), settings(1, 10, 10)).await.unwrap();
    assert_eq!(stats.rows_read, 5);
    assert_eq!(stats.rows_skipped, 3);
    assert_eq!(stats.sentences_persisted, 2);
    // A key seen only on skipped rows never produces a document.
    assert_eq!(stats.documents_created, 1);

    let documents = store.all_documents().unwrap();
    assert_eq!(documents[0].sentence_count, 2);
    let sentences = store.sentences_by_document_id(&documents[0].id).unwrap();
    assert!(sentences.iter().any(|s| s.tokenized_text.is_empty()));
}

#[tokio::test]
async fn test_missing_source_touches_nothing() {
    let store = temp_store();
    let existing = Document::new("Keep", "Me", "Around", 1, 2);
    store.write_documents(std::slice::from_ref(&existing)).unwrap();

    let pipeline = IngestionPipeline::new(store.clone(), settings(2, 10, 10));
    let err = pipeline
        .run(Path::new("/definitely/not/here.csv"))
        .await
        .unwrap_err();

    assert!(matches!(err, CorpusError::SourceNotFound(_)));
    assert_eq!(pipeline.state(), IngestionState::Failed);
    assert_eq!(store.all_documents().unwrap(), vec![existing]);
}

#[tokio::test]
async fn test_refresh_replaces_previous_data() {
    let source = write_source(&[
        csv_row("Critique", "Kant", "German Idealism", 1),
        csv_row("Treatise", "Hume", "Empiricism", 2),
    ]);
    let store = temp_store();

    let first = run(store.clone(), source.path(), settings(2, 1, 1)).await.unwrap();
    let first_ids: Vec<String> = store.all_documents().unwrap().into_iter().map(|d| d.id).collect();
    let second = run(store.clone(), source.path(), settings(2, 1, 1)).await.unwrap();

    assert_eq!(first.documents_created, second.documents_created);
    assert_eq!(first.sentences_persisted, second.sentences_persisted);
    assert_eq!(store.document_count(), 2);
    assert_eq!(store.sentence_count(), 2);
    let second_docs = store.all_documents().unwrap();
    assert!(second_docs.iter().all(|d| !first_ids.contains(&d.id)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_run_counts_every_sentence() {
    const ROWS: usize = 12_000;
    let keys = [
        ("Critique", "Kant", "German Idealism"),
        ("Treatise", "Hume", "Empiricism"),
        ("Republic", "Plato", "Plato"),
        ("Ethics", "Spinoza", "Rationalism"),
        ("Capital", "Marx", "Communism"),
    ];
    let lines: Vec<String> = (0..ROWS)
        .map(|n| {
            let (t, a, s) = keys[n % keys.len()];
            csv_row(t, a, s, n)
        })
        .collect();
    let source = write_source(&lines);
    let store = temp_store();

    let stats = run(store.clone(), source.path(), settings(8, 37, 250)).await.unwrap();
    assert_eq!(stats.documents_created, keys.len());
    assert_eq!(stats.sentences_persisted, ROWS as u64);
    assert_eq!(stats.rows_skipped, 0);

    for document in store.all_documents().unwrap() {
        assert_eq!(document.sentence_count, (ROWS / keys.len()) as u64);
        let stored = store.sentences_by_document_id(&document.id).unwrap();
        assert_eq!(stored.len() as u64, document.sentence_count);
    }
}

#[tokio::test]
async fn test_rejected_batch_fails_run_without_rollback() {
    let lines: Vec<String> = (0..10)
        .map(|n| csv_row("Critique", "Kant", "German Idealism", n))
        .collect();
    let source = write_source(&lines);
    let store = Arc::new(RejectingStore {
        inner: DbOperations::temporary().unwrap(),
        sentence_calls: AtomicUsize::new(0),
        reject_from: 2,
    });

    let pipeline = IngestionPipeline::new(store.clone(), settings(1, 10, 3));
    let err = pipeline.run(source.path()).await.unwrap_err();

    assert!(err.is_write_failure());
    assert_eq!(pipeline.state(), IngestionState::Failed);
    assert!(store.has_data().unwrap());
    assert_eq!(store.inner.sentence_count(), 3);
    assert_eq!(store.inner.document_count(), 0);
}

#[tokio::test]
async fn test_header_only_source() {
    let source = write_source(&[]);
    let store = temp_store();
    let pipeline = IngestionPipeline::new(store.clone(), settings(2, 10, 10));

    let stats = pipeline.run(source.path()).await.unwrap();
    assert_eq!(stats.rows_read, 0);
    assert_eq!(stats.documents_created, 0);
    assert_eq!(pipeline.state(), IngestionState::Complete);
    assert!(!store.has_data().unwrap());
}

#[tokio::test]
async fn test_crlf_source() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}\r\n{}\r\n", HEADER, csv_row("Critique", "Kant", "German Idealism", 1)).unwrap();
    file.flush().unwrap();
    let store = temp_store();

    run(store.clone(), file.path(), settings(1, 10, 10)).await.unwrap();
    let documents = store.all_documents().unwrap();
    let sentences = store.sentences_by_document_id(&documents[0].id).unwrap();
    assert_eq!(sentences[0].lemmatized, "sentence 1 raw");
}

#[tokio::test]
async fn test_pipeline_is_single_use() {
    let source = write_source(&[csv_row("Critique", "Kant", "German Idealism", 1)]);
    let pipeline = IngestionPipeline::new(temp_store(), settings(1, 10, 10));
    pipeline.run(source.path()).await.unwrap();
    assert!(pipeline.state().is_terminal());
    assert!(matches!(
        pipeline.run(source.path()).await,
        Err(CorpusError::Internal(_))
    ));
}

#[tokio::test]
async fn test_worker_panic_stops_the_run() {
    let lines: Vec<String> = (0..200)
        .map(|n| csv_row("Critique", "Kant", "German Idealism", n))
        .collect();
    let source = write_source(&lines);
    let store = Arc::new(PanickingStore {
        inner: DbOperations::temporary().unwrap(),
        sentence_calls: AtomicUsize::new(0),
    });

    let pipeline = IngestionPipeline::new(store.clone(), settings(1, 10, 10));
    let err = pipeline.run(source.path()).await.unwrap_err();

    assert!(matches!(err, CorpusError::Internal(_)));
    assert_eq!(pipeline.state(), IngestionState::Failed);
    // The first batch panics; no other chunk may reach the store after it.
    assert_eq!(store.sentence_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.inner.sentence_count(), 0);
    assert_eq!(store.inner.document_count(), 0);
}

//! Ingestion orchestrator: purge, stream, fan out, drain.

use super::batch_writer::BatchWriter;
use super::grouping::GroupingStore;
use super::line_parser::parse_line;
use super::row_mapper::map_row;
use super::{IngestionState, IngestionStats};
use crate::config::IngestionSettings;
use crate::db_operations::CorpusStore;
use crate::error::{CorpusError, CorpusResult};
use crate::model::SentenceRecord;
use crate::{log_ingestion_debug, log_ingestion_error, log_ingestion_info};
use chrono::Utc;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Runs one destructive refresh of the store from a CSV source.
///
/// A pipeline is single-use: it starts in [`IngestionState::Idle`] and ends
/// in `Complete` or `Failed`. Build a new one for every refresh.
pub struct IngestionPipeline {
    store: Arc<dyn CorpusStore>,
    settings: IngestionSettings,
    state: RwLock<IngestionState>,
}

/// State shared by the reader and every worker of one run
struct RunContext {
    grouping: GroupingStore,
    writer: BatchWriter,
    aborted: AtomicBool,
    rows_read: AtomicU64,
    rows_skipped: AtomicU64,
}

impl RunContext {
    fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Parse, map, group and buffer every line of a chunk
    fn process_chunk(&self, lines: Vec<String>) -> CorpusResult<()> {
        for line in lines {
            if self.is_aborted() {
                return Ok(());
            }
            self.rows_read.fetch_add(1, Ordering::Relaxed);

            let row = match map_row(parse_line(&line)) {
                Ok(row) => row,
                Err(reason) => {
                    self.rows_skipped.fetch_add(1, Ordering::Relaxed);
                    log_ingestion_debug!("Skipping row: {}", reason);
                    continue;
                }
            };

            let slot = self
                .grouping
                .get_or_create(row.grouping_key(), || row.new_document());
            let record = SentenceRecord::from_row(slot.id(), row);
            if let Err(e) = self.writer.add_child(record) {
                self.abort();
                return Err(e);
            }
            slot.increment_sentence_count();
        }
        Ok(())
    }
}

impl IngestionPipeline {
    pub fn new(store: Arc<dyn CorpusStore>, settings: IngestionSettings) -> Self {
        Self {
            store,
            settings,
            state: RwLock::new(IngestionState::Idle),
        }
    }

    /// Current state of this run
    pub fn state(&self) -> IngestionState {
        self.state
            .read()
            .map(|s| *s)
            .unwrap_or(IngestionState::Failed)
    }

    fn transition(&self, next: IngestionState) {
        if let Ok(mut state) = self.state.write() {
            log_ingestion_debug!("Ingestion state {} -> {}", *state, next);
            *state = next;
        }
    }

    /// Purge the store and reload it from `source`.
    ///
    /// Returns statistics on success. On failure the store is left with
    /// whatever was committed before the error; nothing is rolled back.
    pub async fn run(&self, source: &Path) -> CorpusResult<IngestionStats> {
        if self.state() != IngestionState::Idle {
            return Err(CorpusError::internal(
                "ingestion pipeline has already been run",
            ));
        }

        let started_at = Utc::now();
        let timer = Instant::now();
        log_ingestion_info!("Starting refresh from {}", source.display());

        match self.execute(source).await {
            Ok(mut stats) => {
                self.transition(IngestionState::Complete);
                stats.started_at = started_at;
                stats.finished_at = Utc::now();
                stats.elapsed_ms = timer.elapsed().as_millis() as u64;
                log_ingestion_info!(
                    "Refresh completed in {:.2}s: {} documents, {} sentences, {} rows skipped",
                    timer.elapsed().as_secs_f64(),
                    stats.documents_created,
                    stats.sentences_persisted,
                    stats.rows_skipped
                );
                Ok(stats)
            }
            Err(e) => {
                self.transition(IngestionState::Failed);
                log_ingestion_error!("Refresh from {} failed: {}", source.display(), e);
                Err(e)
            }
        }
    }

    async fn execute(&self, source: &Path) -> CorpusResult<IngestionStats> {
        self.transition(IngestionState::Purging);
        let file = open_source(source).await?;
        let store = Arc::clone(&self.store);
        blocking(move || store.purge()).await?;

        self.transition(IngestionState::Streaming);
        let run = Arc::new(RunContext {
            grouping: GroupingStore::new(),
            writer: BatchWriter::new(Arc::clone(&self.store), self.settings.batch_size),
            aborted: AtomicBool::new(false),
            rows_read: AtomicU64::new(0),
            rows_skipped: AtomicU64::new(0),
        });

        let mut workers = JoinSet::new();
        let streamed = self.stream(file, &run, &mut workers).await;
        if streamed.is_err() {
            run.abort();
        }
        let joined = join_workers(&mut workers).await;
        streamed?;
        joined?;

        self.transition(IngestionState::Draining);
        let drain = Arc::clone(&run);
        let documents_created = blocking(move || {
            drain.writer.flush()?;
            let documents = drain.grouping.snapshot();
            drain.writer.write_documents(&documents)
        })
        .await?;

        Ok(IngestionStats {
            documents_created,
            sentences_persisted: run.writer.sentences_written(),
            rows_read: run.rows_read.load(Ordering::Acquire),
            rows_skipped: run.rows_skipped.load(Ordering::Acquire),
            batches_written: run.writer.batches_written(),
            ..IngestionStats::default()
        })
    }

    /// Read the source line by line and hand chunks of lines to workers.
    /// Each worker holds a semaphore permit, which bounds the fan-out.
    async fn stream(
        &self,
        file: File,
        run: &Arc<RunContext>,
        workers: &mut JoinSet<CorpusResult<()>>,
    ) -> CorpusResult<()> {
        let worker_count = self.settings.effective_worker_count();
        let chunk_size = self.settings.chunk_size.max(1);
        let permits = Arc::new(Semaphore::new(worker_count));
        log_ingestion_debug!(
            "Streaming with {} workers, {} lines per chunk",
            worker_count,
            chunk_size
        );

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();

        // Header
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }

        let mut chunk = Vec::with_capacity(chunk_size);
        loop {
            if run.is_aborted() {
                return Ok(());
            }
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            chunk.push(line.trim_end_matches(['\n', '\r']).to_string());

            if chunk.len() >= chunk_size {
                let full = std::mem::replace(&mut chunk, Vec::with_capacity(chunk_size));
                dispatch(&permits, run, workers, full).await?;
                reap_finished(workers)?;
            }
        }
        if !chunk.is_empty() {
            dispatch(&permits, run, workers, chunk).await?;
        }
        Ok(())
    }
}

/// Sets the abort flag if the worker holding it unwinds
struct AbortOnPanic(Arc<RunContext>);

impl Drop for AbortOnPanic {
    fn drop(&mut self) {
        if std::thread::panicking() {
            log_ingestion_error!("Ingestion worker panicked, aborting run");
            self.0.abort();
        }
    }
}

async fn dispatch(
    permits: &Arc<Semaphore>,
    run: &Arc<RunContext>,
    workers: &mut JoinSet<CorpusResult<()>>,
    lines: Vec<String>,
) -> CorpusResult<()> {
    let permit = Arc::clone(permits)
        .acquire_owned()
        .await
        .map_err(|_| CorpusError::internal("worker pool closed"))?;
    if run.is_aborted() {
        return Ok(());
    }
    let run = Arc::clone(run);
    workers.spawn_blocking(move || {
        // Dropped in reverse order: the abort flag is set before the permit
        // is released.
        let _permit = permit;
        let guard = AbortOnPanic(run);
        guard.0.process_chunk(lines)
    });
    Ok(())
}

fn worker_result(joined: Result<CorpusResult<()>, JoinError>) -> CorpusResult<()> {
    joined
        .map_err(|e| CorpusError::internal(format!("ingestion worker failed: {}", e)))
        .and_then(|r| r)
}

/// Collect workers that have already finished without waiting on the rest
fn reap_finished(workers: &mut JoinSet<CorpusResult<()>>) -> CorpusResult<()> {
    while let Some(joined) = workers.try_join_next() {
        worker_result(joined)?;
    }
    Ok(())
}

/// Wait for every worker. Returns the first error; a panicked worker counts
/// as an internal error.
async fn join_workers(workers: &mut JoinSet<CorpusResult<()>>) -> CorpusResult<()> {
    let mut first_error = None;
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = worker_result(joined) {
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

async fn open_source(source: &Path) -> CorpusResult<File> {
    match File::open(source).await {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(CorpusError::SourceNotFound(source.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

async fn blocking<T, F>(f: F) -> CorpusResult<T>
where
    F: FnOnce() -> CorpusResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CorpusError::internal(format!("blocking task failed: {}", e)))?
}

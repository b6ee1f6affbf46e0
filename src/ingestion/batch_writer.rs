//! Buffers sentence records and writes them to the store in bulk.

use crate::db_operations::{CorpusStore, ErrorUtils};
use crate::error::{CorpusError, CorpusResult};
use crate::model::{Document, SentenceRecord};
use crate::{log_batch_debug, log_batch_error};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Accumulates sentence records from many workers and flushes them in
/// batches of at most `batch_size`.
///
/// The buffer lock is only held to push a record or to swap a full buffer
/// for an empty one. The actual write happens outside the lock on the thread
/// that filled the batch, so other workers keep appending to the fresh
/// buffer while it runs.
///
/// A failed write is returned as [`CorpusError::WriteFailure`]. Batches that
/// were already written stay written.
pub struct BatchWriter {
    store: Arc<dyn CorpusStore>,
    batch_size: usize,
    buffer: Mutex<Vec<SentenceRecord>>,
    sentences_written: AtomicU64,
    batches_written: AtomicU64,
}

impl BatchWriter {
    pub fn new(store: Arc<dyn CorpusStore>, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            store,
            batch_size,
            buffer: Mutex::new(Vec::with_capacity(batch_size)),
            sentences_written: AtomicU64::new(0),
            batches_written: AtomicU64::new(0),
        }
    }

    /// Buffer a record, writing the buffer out if it is full
    pub fn add_child(&self, record: SentenceRecord) -> CorpusResult<()> {
        let full = {
            let mut buffer = self.lock_buffer()?;
            buffer.push(record);
            if buffer.len() >= self.batch_size {
                Some(std::mem::replace(
                    &mut *buffer,
                    Vec::with_capacity(self.batch_size),
                ))
            } else {
                None
            }
        };

        match full {
            Some(batch) => self.write_batch(batch),
            None => Ok(()),
        }
    }

    /// Write whatever is buffered
    pub fn flush(&self) -> CorpusResult<()> {
        let batch = std::mem::take(&mut *self.lock_buffer()?);
        if batch.is_empty() {
            return Ok(());
        }
        self.write_batch(batch)
    }

    /// Write the complete parent set in one bulk call
    pub fn write_documents(&self, documents: &[Document]) -> CorpusResult<usize> {
        let written = self
            .store
            .write_documents(documents)
            .map_err(|e| Self::as_write_failure("documents", e))?;
        log_batch_debug!("Wrote {} documents", written);
        Ok(written)
    }

    /// Sentences persisted so far
    pub fn sentences_written(&self) -> u64 {
        self.sentences_written.load(Ordering::Acquire)
    }

    /// Sentence batches persisted so far
    pub fn batches_written(&self) -> u64 {
        self.batches_written.load(Ordering::Acquire)
    }

    /// Records buffered but not yet written
    pub fn pending(&self) -> usize {
        self.buffer.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn lock_buffer(&self) -> CorpusResult<std::sync::MutexGuard<'_, Vec<SentenceRecord>>> {
        self.buffer
            .lock()
            .map_err(|_| ErrorUtils::lock_error("sentence buffer"))
    }

    fn write_batch(&self, batch: Vec<SentenceRecord>) -> CorpusResult<()> {
        let written = self
            .store
            .write_sentences(&batch)
            .map_err(|e| Self::as_write_failure("sentences", e))?;

        let total = self
            .sentences_written
            .fetch_add(written as u64, Ordering::AcqRel)
            + written as u64;
        let batches = self.batches_written.fetch_add(1, Ordering::AcqRel) + 1;
        log_batch_debug!(
            "Wrote sentence batch #{} ({} records, {} total)",
            batches,
            written,
            total
        );
        Ok(())
    }

    fn as_write_failure(what: &str, error: CorpusError) -> CorpusError {
        log_batch_error!("Bulk write of {} failed: {}", what, error);
        match error {
            CorpusError::WriteFailure(_) => error,
            other => CorpusError::write_failure(format!("{}: {}", what, other)),
        }
    }
}

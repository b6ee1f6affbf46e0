//! Concurrent grouping of rows into parent documents.

use crate::log_grouping_debug;
use crate::model::{Document, GroupingKey};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A document shared between workers while a run is in flight. The metadata
/// is fixed at creation; only the sentence count moves.
#[derive(Debug)]
pub struct DocumentSlot {
    document: Document,
    sentence_count: AtomicU64,
}

impl DocumentSlot {
    fn new(document: Document) -> Self {
        let sentence_count = AtomicU64::new(document.sentence_count);
        Self {
            document,
            sentence_count,
        }
    }

    /// Identifier assigned to this document
    pub fn id(&self) -> &str {
        &self.document.id
    }

    /// Atomically add one sentence, returning the new count
    pub fn increment_sentence_count(&self) -> u64 {
        self.sentence_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn sentence_count(&self) -> u64 {
        self.sentence_count.load(Ordering::Acquire)
    }

    /// The document with its current sentence count
    pub fn snapshot(&self) -> Document {
        Document {
            sentence_count: self.sentence_count(),
            ..self.document.clone()
        }
    }
}

/// Maps grouping keys to the document created for them during one run.
///
/// Backed by a sharded map: lookups and inserts for different keys rarely
/// contend, and inserts for the same key are serialized by the shard lock so
/// exactly one document is created per key.
#[derive(Debug, Default)]
pub struct GroupingStore {
    groups: DashMap<GroupingKey, Arc<DocumentSlot>>,
}

impl GroupingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the document for `key`, creating it with `factory` if this is
    /// the first time the key is seen.
    ///
    /// `factory` runs at most once per key. Every caller for the same key,
    /// on any thread, gets the same slot back.
    pub fn get_or_create<F>(&self, key: GroupingKey, factory: F) -> Arc<DocumentSlot>
    where
        F: FnOnce() -> Document,
    {
        if let Some(slot) = self.groups.get(&key) {
            return Arc::clone(slot.value());
        }

        let slot = self.groups.entry(key).or_insert_with(|| {
            let document = factory();
            log_grouping_debug!(
                "Created document {} for '{}' by {}",
                document.id,
                document.title,
                document.author
            );
            Arc::new(DocumentSlot::new(document))
        });
        Arc::clone(slot.value())
    }

    /// Look up the slot for `key` without creating it
    pub fn get(&self, key: &GroupingKey) -> Option<Arc<DocumentSlot>> {
        self.groups.get(key).map(|slot| Arc::clone(slot.value()))
    }

    /// Number of distinct documents
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All documents with their current sentence counts
    pub fn snapshot(&self) -> Vec<Document> {
        self.groups
            .iter()
            .map(|entry| entry.value().snapshot())
            .collect()
    }

    /// Total sentences counted across every document
    pub fn total_sentences(&self) -> u64 {
        self.groups
            .iter()
            .map(|entry| entry.value().sentence_count())
            .sum()
    }
}

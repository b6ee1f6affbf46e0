//! The store seam the ingestion pipeline and the service are written against.

use super::core::{DbOperations, DOCUMENTS_TREE, SENTENCES_TREE};
use crate::error::CorpusResult;
use crate::model::{Document, SentenceRecord};
use std::collections::HashMap;

/// Two-collection document store: documents and the sentences that reference
/// them.
///
/// The two collections are written independently; nothing ties a sentence
/// batch and the document set into one transaction.
pub trait CorpusStore: Send + Sync {
    /// Delete every document and sentence
    fn purge(&self) -> CorpusResult<()>;

    /// Bulk write documents. Errors are `WriteFailure`.
    fn write_documents(&self, documents: &[Document]) -> CorpusResult<usize>;

    /// Bulk write one batch of sentences. Errors are `WriteFailure`.
    fn write_sentences(&self, sentences: &[SentenceRecord]) -> CorpusResult<usize>;

    /// True if either collection holds any entry
    fn has_data(&self) -> CorpusResult<bool>;

    fn all_documents(&self) -> CorpusResult<Vec<Document>>;

    fn document_by_id(&self, id: &str) -> CorpusResult<Option<Document>>;

    fn sentences_by_document_id(&self, id: &str) -> CorpusResult<Vec<SentenceRecord>>;

    /// Entry count per collection
    fn entry_counts(&self) -> CorpusResult<HashMap<String, u64>>;
}

impl CorpusStore for DbOperations {
    fn purge(&self) -> CorpusResult<()> {
        self.clear_tree(&self.documents_tree, DOCUMENTS_TREE)?;
        self.clear_tree(&self.sentences_tree, SENTENCES_TREE)?;
        crate::log_database_info!("Purged documents and sentences");
        Ok(())
    }

    fn write_documents(&self, documents: &[Document]) -> CorpusResult<usize> {
        self.insert_documents(documents)
    }

    fn write_sentences(&self, sentences: &[SentenceRecord]) -> CorpusResult<usize> {
        self.insert_sentences(sentences)
    }

    fn has_data(&self) -> CorpusResult<bool> {
        Ok(!self.tree_is_empty(&self.documents_tree) || !self.tree_is_empty(&self.sentences_tree))
    }

    fn all_documents(&self) -> CorpusResult<Vec<Document>> {
        self.list_documents()
    }

    fn document_by_id(&self, id: &str) -> CorpusResult<Option<Document>> {
        self.get_document(id)
    }

    fn sentences_by_document_id(&self, id: &str) -> CorpusResult<Vec<SentenceRecord>> {
        self.sentences_for_document(id)
    }

    fn entry_counts(&self) -> CorpusResult<HashMap<String, u64>> {
        Ok(self.get_stats())
    }
}

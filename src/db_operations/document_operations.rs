use super::core::{DbOperations, DOCUMENTS_TREE};
use crate::error::CorpusResult;
use crate::model::Document;

impl DbOperations {
    /// Bulk insert documents, keyed by their id
    pub fn insert_documents(&self, documents: &[Document]) -> CorpusResult<usize> {
        self.insert_batch_in_tree(
            &self.documents_tree,
            DOCUMENTS_TREE,
            documents.iter().map(|d| (d.id.clone(), d)),
        )
    }

    /// Retrieve a document by id
    pub fn get_document(&self, id: &str) -> CorpusResult<Option<Document>> {
        self.get_from_tree(&self.documents_tree, id)
    }

    /// List every stored document
    pub fn list_documents(&self) -> CorpusResult<Vec<Document>> {
        self.list_items_in_tree(&self.documents_tree)
    }

    /// Number of stored documents
    pub fn document_count(&self) -> usize {
        self.documents_tree.len()
    }
}

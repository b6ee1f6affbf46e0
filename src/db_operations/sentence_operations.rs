use super::core::{DbOperations, SENTENCES_TREE};
use crate::error::CorpusResult;
use crate::model::SentenceRecord;

/// Storage key for a sentence. Prefixing with the document id keeps a
/// document's sentences contiguous.
pub fn sentence_key(document_id: &str, sentence_id: &str) -> String {
    format!("{}:{}", document_id, sentence_id)
}

impl DbOperations {
    /// Bulk insert sentences as one atomic batch
    pub fn insert_sentences(&self, sentences: &[SentenceRecord]) -> CorpusResult<usize> {
        self.insert_batch_in_tree(
            &self.sentences_tree,
            SENTENCES_TREE,
            sentences
                .iter()
                .map(|s| (sentence_key(&s.document_id, &s.id), s)),
        )
    }

    /// All sentences that reference `document_id`
    pub fn sentences_for_document(&self, document_id: &str) -> CorpusResult<Vec<SentenceRecord>> {
        let prefix = format!("{}:", document_id);
        self.list_items_with_prefix(&self.sentences_tree, &prefix)
    }

    /// Number of stored sentences
    pub fn sentence_count(&self) -> usize {
        self.sentences_tree.len()
    }
}

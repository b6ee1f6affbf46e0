use super::error_utils::ErrorUtils;
use crate::error::CorpusResult;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Name of the tree holding documents, keyed by document id
pub const DOCUMENTS_TREE: &str = "documents";
/// Name of the tree holding sentences, keyed by `<document id>:<sentence id>`
pub const SENTENCES_TREE: &str = "sentences";

/// Unified access to the sled trees backing the corpus store.
///
/// The trees keep the underlying sled database open for as long as this
/// value (or a clone) lives.
#[derive(Clone)]
pub struct DbOperations {
    pub(crate) documents_tree: sled::Tree,
    pub(crate) sentences_tree: sled::Tree,
}

impl DbOperations {
    /// Creates a new DbOperations instance with all required trees
    pub fn new(db: sled::Db) -> Result<Self, sled::Error> {
        let documents_tree = db.open_tree(DOCUMENTS_TREE)?;
        let sentences_tree = db.open_tree(SENTENCES_TREE)?;

        Ok(Self {
            documents_tree,
            sentences_tree,
        })
    }

    /// Opens (or creates) the database stored at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> CorpusResult<Self> {
        let db = sled::open(path.as_ref()).map_err(ErrorUtils::from_sled_error("open"))?;
        Self::new(db).map_err(ErrorUtils::from_sled_error("open trees"))
    }

    /// Opens a throwaway in-memory database, removed on drop
    pub fn temporary() -> CorpusResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(ErrorUtils::from_sled_error("open temporary"))?;
        Self::new(db).map_err(ErrorUtils::from_sled_error("open trees"))
    }

    /// Gets database statistics
    pub fn get_stats(&self) -> HashMap<String, u64> {
        let mut stats = HashMap::new();
        stats.insert(
            DOCUMENTS_TREE.to_string(),
            self.documents_tree.len() as u64,
        );
        stats.insert(
            SENTENCES_TREE.to_string(),
            self.sentences_tree.len() as u64,
        );
        stats
    }

    // ========== GENERIC TREE OPERATIONS ==========

    /// Retrieve any deserializable item from a specific tree
    pub fn get_from_tree<T: DeserializeOwned>(
        &self,
        tree: &sled::Tree,
        key: &str,
    ) -> CorpusResult<Option<T>> {
        match tree.get(key.as_bytes()) {
            Ok(Some(bytes)) => {
                let item = serde_json::from_slice(&bytes)
                    .map_err(ErrorUtils::from_deserialization_error(key))?;
                Ok(Some(item))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(ErrorUtils::database_error("retrieve", e)),
        }
    }

    /// List all values in a tree
    pub fn list_items_in_tree<T: DeserializeOwned>(
        &self,
        tree: &sled::Tree,
    ) -> CorpusResult<Vec<T>> {
        Self::decode_all(tree.iter())
    }

    /// List all values whose key starts with `prefix`
    pub fn list_items_with_prefix<T: DeserializeOwned>(
        &self,
        tree: &sled::Tree,
        prefix: &str,
    ) -> CorpusResult<Vec<T>> {
        Self::decode_all(tree.scan_prefix(prefix.as_bytes()))
    }

    fn decode_all<T, I>(iter: I) -> CorpusResult<Vec<T>>
    where
        T: DeserializeOwned,
        I: Iterator<Item = Result<(sled::IVec, sled::IVec), sled::Error>>,
    {
        let mut items = Vec::new();
        for result in iter {
            let (key, value) = result.map_err(ErrorUtils::from_sled_error("iterate"))?;
            let key_str = String::from_utf8_lossy(&key).to_string();
            let item = serde_json::from_slice(&value)
                .map_err(ErrorUtils::from_deserialization_error(&key_str))?;
            items.push(item);
        }
        Ok(items)
    }

    /// Write `(key, item)` pairs into `tree` as one atomic batch and flush.
    ///
    /// Any failure is reported as a write failure, including serialization.
    pub fn insert_batch_in_tree<'a, T, I>(
        &self,
        tree: &sled::Tree,
        tree_name: &str,
        items: I,
    ) -> CorpusResult<usize>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = (String, &'a T)>,
    {
        let mut batch = sled::Batch::default();
        let mut count = 0;
        for (key, item) in items {
            let bytes = serde_json::to_vec(item).map_err(|e| {
                crate::error::CorpusError::write_failure(format!(
                    "Serialization failed for '{}': {}",
                    key, e
                ))
            })?;
            batch.insert(key.as_bytes(), bytes);
            count += 1;
        }

        tree.apply_batch(batch)
            .map_err(|e| ErrorUtils::write_error(tree_name, count, e))?;
        tree.flush()
            .map_err(|e| ErrorUtils::write_error(tree_name, count, e))?;

        Ok(count)
    }

    /// Remove every entry from a tree
    pub fn clear_tree(&self, tree: &sled::Tree, tree_name: &str) -> CorpusResult<()> {
        tree.clear()
            .map_err(|e| ErrorUtils::tree_error("clear", tree_name, e))?;
        tree.flush()
            .map_err(|e| ErrorUtils::tree_error("flush", tree_name, e))?;
        Ok(())
    }

    /// Check if a tree holds no entries
    pub fn tree_is_empty(&self, tree: &sled::Tree) -> bool {
        tree.is_empty()
    }
}

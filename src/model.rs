//! Stored entities: documents (one per source text) and the sentence records
//! that reference them.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Separator used by [`GroupingKey`]'s display form. Never appears in corpus
/// text, so distinct triples never render to the same string.
pub const KEY_SEPARATOR: char = '\u{1f}';

/// Parent aggregate representing one source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub author: String,
    pub school: String,
    pub original_publication_year: i32,
    pub corpus_edition_year: i32,
    pub sentence_count: u64,
}

impl Document {
    /// Create a document with a freshly generated identifier and no sentences
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        school: impl Into<String>,
        original_publication_year: i32,
        corpus_edition_year: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            author: author.into(),
            school: school.into(),
            original_publication_year,
            corpus_edition_year,
            sentence_count: 0,
        }
    }

    /// The grouping key this document was created for
    pub fn grouping_key(&self) -> GroupingKey {
        GroupingKey::new(&self.title, &self.author, &self.school)
    }
}

/// One sentence of a source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub id: String,
    pub document_id: String,
    /// Raw sentence text
    pub sentence: String,
    /// Tagged/normalized variant of the sentence
    pub sentence_tagged: String,
    pub sentence_lowered: String,
    pub lemmatized: String,
    pub sentence_length: i32,
    pub tokenized_text: Vec<String>,
}

impl SentenceRecord {
    /// Build the child record for `row`, owned by `document_id`
    pub fn from_row(document_id: impl Into<String>, row: RowData) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.into(),
            sentence: row.sentence,
            sentence_tagged: row.sentence_tagged,
            sentence_lowered: row.sentence_lowered,
            lemmatized: row.lemmatized,
            sentence_length: row.sentence_length,
            tokenized_text: row.tokenized_text,
        }
    }
}

/// A validated source row, before it is split into document and sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowData {
    pub title: String,
    pub author: String,
    pub school: String,
    pub sentence_tagged: String,
    pub sentence: String,
    pub original_publication_year: i32,
    pub corpus_edition_year: i32,
    pub sentence_length: i32,
    pub sentence_lowered: String,
    pub tokenized_text: Vec<String>,
    pub lemmatized: String,
}

impl RowData {
    pub fn grouping_key(&self) -> GroupingKey {
        GroupingKey::new(&self.title, &self.author, &self.school)
    }

    /// A new document for this row's title/author/school and years
    pub fn new_document(&self) -> Document {
        Document::new(
            &self.title,
            &self.author,
            &self.school,
            self.original_publication_year,
            self.corpus_edition_year,
        )
    }
}

/// Exact, case-sensitive (title, author, school) triple deciding which rows
/// share a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupingKey {
    title: String,
    author: String,
    school: String,
}

impl GroupingKey {
    pub fn new(title: &str, author: &str, school: &str) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            school: school.to_string(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn school(&self) -> &str {
        &self.school
    }
}

impl fmt::Display for GroupingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.title,
            self.author,
            self.school,
            sep = KEY_SEPARATOR
        )
    }
}

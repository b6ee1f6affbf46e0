//! Converts parsed fields into a typed [`RowData`].
//!
//! Column layout of the source:
//!
//! | idx | column                        |
//! |-----|-------------------------------|
//! | 0   | title                         |
//! | 1   | author                        |
//! | 2   | school                        |
//! | 3   | sentence, tagged variant      |
//! | 4   | sentence, raw                 |
//! | 5   | original publication year     |
//! | 6   | corpus edition year           |
//! | 7   | sentence length               |
//! | 8   | sentence, lowercase           |
//! | 9   | tokenized text (`['a', 'b']`) |
//! | 10  | lemmatized                    |

use crate::model::RowData;
use thiserror::Error;

/// Minimum number of fields a row must have
pub const COLUMN_COUNT: usize = 11;

const TITLE: usize = 0;
const AUTHOR: usize = 1;
const SCHOOL: usize = 2;
const SENTENCE_TAGGED: usize = 3;
const SENTENCE_RAW: usize = 4;
const ORIGINAL_PUBLICATION_YEAR: usize = 5;
const CORPUS_EDITION_YEAR: usize = 6;
const SENTENCE_LENGTH: usize = 7;
const SENTENCE_LOWERED: usize = 8;
const TOKENIZED_TEXT: usize = 9;
const LEMMATIZED: usize = 10;

/// Why a row was skipped. Never fatal to a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    #[error("expected at least 11 fields, found {0}")]
    TooFewColumns(usize),

    #[error("column {column} ({name}) is not an integer: '{value}'")]
    InvalidInteger {
        column: usize,
        name: &'static str,
        value: String,
    },
}

/// Map parsed fields onto a [`RowData`].
///
/// Only the column count and the three integer columns are hard
/// requirements. An undecodable token list becomes an empty list.
pub fn map_row(fields: Vec<String>) -> Result<RowData, RowRejection> {
    if fields.len() < COLUMN_COUNT {
        return Err(RowRejection::TooFewColumns(fields.len()));
    }

    let original_publication_year =
        parse_int(&fields, ORIGINAL_PUBLICATION_YEAR, "original publication year")?;
    let corpus_edition_year = parse_int(&fields, CORPUS_EDITION_YEAR, "corpus edition year")?;
    let sentence_length = parse_int(&fields, SENTENCE_LENGTH, "sentence length")?;
    let tokenized_text = decode_tokens(&fields[TOKENIZED_TEXT]).unwrap_or_default();

    let mut fields = fields;
    let mut take = |column: usize| std::mem::take(&mut fields[column]);

    Ok(RowData {
        title: take(TITLE),
        author: take(AUTHOR),
        school: take(SCHOOL),
        sentence_tagged: take(SENTENCE_TAGGED),
        sentence: take(SENTENCE_RAW),
        original_publication_year,
        corpus_edition_year,
        sentence_length,
        sentence_lowered: take(SENTENCE_LOWERED),
        tokenized_text,
        lemmatized: take(LEMMATIZED),
    })
}

fn parse_int(fields: &[String], column: usize, name: &'static str) -> Result<i32, RowRejection> {
    let value = &fields[column];
    value
        .trim()
        .parse()
        .map_err(|_| RowRejection::InvalidInteger {
            column,
            name,
            value: value.clone(),
        })
}

/// Decode a bracketed list of quoted tokens, e.g. `['one', "don't", 'x']`.
///
/// Tokens may be quoted with `'` or `"`; backslash escapes inside a token are
/// resolved. Returns `None` if the text is not such a list. An empty field
/// decodes to an empty list.
pub fn decode_tokens(raw: &str) -> Option<Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Vec::new());
    }
    let inner = raw.strip_prefix('[')?.strip_suffix(']')?;

    let mut tokens = Vec::new();
    let mut chars = inner.chars().peekable();
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let quote = match chars.next() {
            None if tokens.is_empty() => return Some(tokens),
            Some(q @ ('\'' | '"')) => q,
            _ => return None,
        };

        let mut token = String::new();
        loop {
            match chars.next()? {
                '\\' => match chars.next()? {
                    'n' => token.push('\n'),
                    't' => token.push('\t'),
                    other => token.push(other),
                },
                c if c == quote => break,
                c => token.push(c),
            }
        }
        tokens.push(token);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            None => return Some(tokens),
            Some(',') => continue,
            Some(_) => return None,
        }
    }
}

//! Tokenization shared by training examples and queries

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// One token of a training example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternToken {
    /// Lowercased literal word
    Word(String),
    /// `:param` placeholder
    Slot(String),
}

/// One word of a query with its byte span in the query text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryToken<'a> {
    pub raw: &'a str,
    pub lower: String,
    pub start: usize,
    pub end: usize,
}

/// Split a training utterance into words and placeholders
pub fn tokenize_pattern(utterance: &str) -> Vec<PatternToken> {
    let mut tokens = Vec::new();

    for piece in utterance.split_whitespace() {
        if let Some(name) = placeholder(piece) {
            tokens.push(PatternToken::Slot(name.to_string()));
            continue;
        }

        tokens.extend(
            piece
                .unicode_words()
                .map(|w| PatternToken::Word(w.to_lowercase())),
        );
    }

    tokens
}

/// Split a query into words using Unicode word boundaries
pub fn tokenize_query(query: &str) -> Vec<QueryToken<'_>> {
    query
        .unicode_word_indices()
        .map(|(start, word)| QueryToken {
            raw: word,
            lower: word.to_lowercase(),
            start,
            end: start + word.len(),
        })
        .collect()
}

fn placeholder(piece: &str) -> Option<&str> {
    let name = piece.strip_prefix(':')?;
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

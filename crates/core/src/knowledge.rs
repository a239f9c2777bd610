//! Knowledge base concepts

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized concept identifier
///
/// Lowercased raw key with every whitespace run collapsed to a single `_`,
/// e.g. "Member ID Lookup" -> "member_id_lookup".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptKey(String);

impl ConceptKey {
    /// Normalize a raw knowledge base key
    pub fn normalize(raw: &str) -> Self {
        let mut key = String::with_capacity(raw.len());
        let mut in_whitespace = false;

        for c in raw.chars() {
            if c.is_whitespace() {
                if !in_whitespace {
                    key.push('_');
                }
                in_whitespace = true;
            } else {
                key.extend(c.to_lowercase());
                in_whitespace = false;
            }
        }

        Self(key)
    }

    /// Wrap an already-normalized key (e.g. parsed from an intent label)
    pub fn from_normalized(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Intent label used for this concept in the training corpus
    pub fn intent_label(&self) -> String {
        format!("{}{}", crate::CONCEPT_INTENT_PREFIX, self.0)
    }
}

impl fmt::Display for ConceptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A question/answer pair attached to a concept
///
/// Entries without a string `answer` are skipped when a concept is parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    #[serde(default, deserialize_with = "crate::lenient::or_default")]
    pub question: String,
    pub answer: String,
}

/// Knowledge base concept record
///
/// `categories`, `related_terms` and `external_links` are opaque: they are
/// echoed back in resolution metadata exactly as authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    #[serde(
        default,
        deserialize_with = "crate::lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// Utterances that should map to this concept
    #[serde(default, deserialize_with = "crate::lenient::list")]
    pub intent_examples: Vec<String>,
    #[serde(default, deserialize_with = "crate::lenient::list")]
    pub faq: Vec<FaqEntry>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub categories: serde_json::Value,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub related_terms: serde_json::Value,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub external_links: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Concept {
    /// Answers registered for this concept's intent
    ///
    /// One per FAQ entry when there are any; otherwise the description when
    /// present; otherwise nothing.
    pub fn answers(&self) -> Vec<String> {
        if !self.faq.is_empty() {
            return self.faq.iter().map(|entry| entry.answer.clone()).collect();
        }

        match &self.description {
            Some(description) if !description.is_empty() => vec![description.clone()],
            _ => Vec::new(),
        }
    }
}

//! Knowledge base of FAQ-style concepts
//!
//! Features:
//! - JSON/YAML knowledge files (`{ "concepts": { "<raw key>": Concept } }`)
//! - O(1) lookup by normalized [`ConceptKey`](site_assistant_core::ConceptKey)
//! - Rejection of raw keys that collide after normalization
//! - Process-scoped, lazily loaded handle with single initialization

pub mod base;
pub mod handle;
pub mod loader;

pub use base::KnowledgeBase;
pub use handle::KnowledgeHandle;
pub use loader::{KnowledgeFile, KnowledgeLoader};

use std::path::PathBuf;

use thiserror::Error;

/// Knowledge base errors
#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge base {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse knowledge base: {0}")]
    Parse(String),

    #[error("Unsupported knowledge file type: {0}")]
    UnsupportedFormat(String),

    #[error("Concept keys {first:?} and {second:?} both normalize to {key:?}")]
    DuplicateConceptKey {
        key: String,
        first: String,
        second: String,
    },
}

impl From<KnowledgeError> for site_assistant_core::Error {
    fn from(err: KnowledgeError) -> Self {
        site_assistant_core::Error::Knowledge(err.to_string())
    }
}

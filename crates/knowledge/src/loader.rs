//! Knowledge Base Loader
//!
//! Reads knowledge files in JSON or YAML and builds a [`KnowledgeBase`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use site_assistant_core::Concept;

use crate::{KnowledgeBase, KnowledgeError};

/// Knowledge base file format
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KnowledgeFile {
    /// Version for format compatibility
    #[serde(
        default,
        deserialize_with = "site_assistant_core::lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
    /// Raw concept key -> concept, parsed one at a time
    #[serde(default, deserialize_with = "site_assistant_core::lenient::or_default")]
    pub concepts: serde_json::Map<String, serde_json::Value>,
}

impl KnowledgeFile {
    /// Parse every concept, skipping the ones that are not concept records
    pub fn into_concepts(self) -> Vec<(String, Concept)> {
        self.concepts
            .into_iter()
            .filter_map(|(raw, value)| match serde_json::from_value::<Concept>(value) {
                Ok(concept) => Some((raw, concept)),
                Err(e) => {
                    tracing::warn!(concept = %raw, error = %e, "Skipping malformed concept");
                    None
                }
            })
            .collect()
    }
}

/// Loader for knowledge base files
pub struct KnowledgeLoader;

impl KnowledgeLoader {
    /// Load and validate a knowledge base file
    ///
    /// The format is chosen by extension: `.json` is JSON, `.yaml`/`.yml` are
    /// YAML, and a file without an extension is read as JSON. Any other
    /// extension is rejected.
    pub async fn load_file(path: &Path) -> Result<KnowledgeBase, KnowledgeError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| KnowledgeError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let kb = Self::parse(&content, extension)?;

        tracing::info!(
            path = %path.display(),
            concepts = kb.len(),
            "Loaded knowledge base"
        );

        Ok(kb)
    }

    /// Parse knowledge base content of the given format
    pub fn parse(content: &str, extension: &str) -> Result<KnowledgeBase, KnowledgeError> {
        let file: KnowledgeFile = match extension {
            "json" => serde_json::from_str(content)
                .map_err(|e| KnowledgeError::Parse(format!("JSON parse error: {}", e)))?,
            "yaml" | "yml" => serde_yaml::from_str(content)
                .map_err(|e| KnowledgeError::Parse(format!("YAML parse error: {}", e)))?,
            other => return Err(KnowledgeError::UnsupportedFormat(other.to_string())),
        };

        KnowledgeBase::from_concepts(file.into_concepts())
    }
}

//! Inference output and query resolution results

use serde::{Deserialize, Serialize};

use crate::knowledge::{Concept, ConceptKey};
use crate::site::SiteId;

/// Intent label shared by every page navigation example
pub const NAVIGATE_INTENT: &str = "navigate_to_page";

/// Prefix of knowledge base concept intents
pub const CONCEPT_INTENT_PREFIX: &str = "concept.";

/// Label returned when nothing scores above the confidence floor
pub const UNRECOGNIZED_INTENT: &str = "None";

/// How an entity was recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Surface-form match against a named entity option
    Enum,
    /// Value bound to a `:param` placeholder
    Regex,
}

/// Entity found in a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEntity {
    /// Entity name (`page`, or a param name such as `claimId`)
    pub entity: String,
    /// Canonical option for enum entities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    /// Text as it appeared in the query
    pub source_text: String,
    /// Byte offset of the match start
    pub start: usize,
    /// Byte offset one past the match end
    pub end: usize,
    pub accuracy: f32,
    #[serde(rename = "type")]
    pub kind: EntityKind,
}

/// Raw engine output for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inference {
    pub intent: String,
    pub score: f32,
    pub entities: Vec<ExtractedEntity>,
    pub answer: Option<String>,
}

impl Inference {
    pub fn unrecognized() -> Self {
        Self {
            intent: UNRECOGNIZED_INTENT.to_string(),
            score: 0.0,
            entities: Vec::new(),
            answer: None,
        }
    }
}

/// Intent label classified once at the resolver boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedIntent {
    /// Page navigation; `page` is the canonical page entity when one matched
    Navigation { page: Option<String> },
    /// Knowledge base concept
    Concept { key: ConceptKey },
    /// Operator-defined routing intent
    Routing { name: String },
    /// Nothing recognized
    Unrecognized,
}

impl ResolvedIntent {
    /// Classify an engine result
    pub fn classify(inference: &Inference) -> Self {
        let label = inference.intent.as_str();

        if label.is_empty() || label == UNRECOGNIZED_INTENT {
            return Self::Unrecognized;
        }

        if label == NAVIGATE_INTENT {
            let page = inference
                .entities
                .iter()
                .find(|e| e.entity == "page")
                .and_then(|e| e.option.clone());
            return Self::Navigation { page };
        }

        if let Some(key) = label.strip_prefix(CONCEPT_INTENT_PREFIX) {
            if !key.is_empty() {
                return Self::Concept {
                    key: ConceptKey::from_normalized(key),
                };
            }
        }

        Self::Routing {
            name: label.to_string(),
        }
    }

    pub fn concept_key(&self) -> Option<&ConceptKey> {
        match self {
            Self::Concept { key } => Some(key),
            _ => None,
        }
    }
}

/// Knowledge base fields attached to a concept match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptMetadata {
    pub description: Option<String>,
    pub categories: serde_json::Value,
    pub related_terms: serde_json::Value,
    pub external_links: serde_json::Value,
    pub priority: Option<serde_json::Value>,
}

impl From<&Concept> for ConceptMetadata {
    fn from(concept: &Concept) -> Self {
        Self {
            description: concept.description.clone(),
            categories: concept.categories.clone(),
            related_terms: concept.related_terms.clone(),
            external_links: concept.external_links.clone(),
            priority: concept.priority.clone(),
        }
    }
}

/// Response for one resolved query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub site_id: SiteId,
    pub query: String,
    pub intent: String,
    pub score: f32,
    pub answer: Option<String>,
    pub entities: Vec<ExtractedEntity>,
    pub metadata: Option<ConceptMetadata>,
    #[serde(skip)]
    pub resolved: ResolvedIntent,
}

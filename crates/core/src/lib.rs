//! Core types for the site assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Site metadata (pages, routing intents) and validated site identifiers
//! - Knowledge base concepts and normalized concept keys
//! - Training corpus produced by the synthesizer
//! - Inference output and query resolution results
//! - Error types
//! - Lenient deserializers for hand-written input

pub mod corpus;
pub mod error;
pub mod knowledge;
pub mod lenient;
pub mod resolution;
pub mod site;

pub use corpus::{EntityOption, LabeledUtterance, NamedEntity, TrainingCorpus};
pub use error::{Error, Result};
pub use knowledge::{Concept, ConceptKey, FaqEntry};
pub use resolution::{
    ConceptMetadata, EntityKind, ExtractedEntity, Inference, ResolutionResult, ResolvedIntent,
    CONCEPT_INTENT_PREFIX, NAVIGATE_INTENT, UNRECOGNIZED_INTENT,
};
pub use site::{normalize_page_name, Page, ResolvedPage, RoutingIntent, SiteId, SiteMetadata, SiteRecord};

//! Natural language understanding for site navigation and FAQ concepts
//!
//! Features:
//! - Corpus synthesis from site metadata and the knowledge base
//! - Pluggable intent engine behind [`IntentEngine`] / [`IntentModel`]
//! - Bundled keyword engine with `:param` placeholder binding
//! - Per-site serialized training with atomic artifact replacement

pub mod cache;
pub mod engine;
pub mod synthesizer;
pub mod trainer;

pub use cache::ModelCache;
pub use engine::{IntentEngine, IntentModel, KeywordEngine, KeywordModel};
pub use synthesizer::{CorpusSynthesizer, SynthesisOptions};
pub use trainer::{ModelTrainer, TrainOutcome, TrainStatus};

use site_assistant_core::SiteId;
use site_assistant_knowledge::KnowledgeError;
use site_assistant_persistence::PersistenceError;
use thiserror::Error;

/// NLU errors
#[derive(Error, Debug)]
pub enum NluError {
    #[error("Site data for siteId '{0}' not found.")]
    SiteNotFound(SiteId),

    #[error("No trained model for siteId '{0}'")]
    ModelNotFound(SiteId),

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Invalid model artifact: {0}")]
    Artifact(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
}

impl From<NluError> for site_assistant_core::Error {
    fn from(err: NluError) -> Self {
        use site_assistant_core::Error;

        match err {
            NluError::SiteNotFound(_) | NluError::ModelNotFound(_) => {
                Error::NotFound(err.to_string())
            }
            NluError::Training(msg) => Error::Training(msg),
            NluError::Artifact(msg) => Error::Inference(msg),
            NluError::Persistence(e) => e.into(),
            NluError::Knowledge(e) => e.into(),
        }
    }
}

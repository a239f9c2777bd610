//! Intent engine seam
//!
//! The trainer and resolver only see [`IntentEngine`] and [`IntentModel`].
//! [`KeywordEngine`] is the bundled implementation.

mod entities;
mod keyword;
mod tokens;

pub use keyword::{KeywordEngine, KeywordModel, ARTIFACT_FORMAT, ARTIFACT_VERSION};

use std::sync::Arc;

use async_trait::async_trait;
use site_assistant_core::{Inference, TrainingCorpus};

use crate::NluError;

/// Trainable intent/entity engine
#[async_trait]
pub trait IntentEngine: Send + Sync {
    /// Engine name, for logs
    fn name(&self) -> &str;

    /// Fit `corpus` and return the serialized model artifact
    async fn train(&self, corpus: &TrainingCorpus) -> Result<Vec<u8>, NluError>;

    /// Deserialize an artifact produced by [`IntentEngine::train`]
    fn load(&self, artifact: &[u8]) -> Result<Arc<dyn IntentModel>, NluError>;
}

/// A trained model answering queries
pub trait IntentModel: Send + Sync {
    fn process(&self, query: &str) -> Inference;
}

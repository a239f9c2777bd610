//! Site assistant facade
//!
//! Wires storage, training and resolution around one shared knowledge base
//! and model cache.

use std::sync::Arc;

use site_assistant_config::Settings;
use site_assistant_core::{ResolutionResult, Result, SiteId, SiteRecord};
use site_assistant_knowledge::KnowledgeHandle;
use site_assistant_nlu::{
    CorpusSynthesizer, IntentEngine, KeywordEngine, ModelCache, ModelTrainer, SynthesisOptions,
    TrainOutcome,
};
use site_assistant_persistence::{FileSiteStore, ModelStore, SiteStore};

use crate::QueryResolver;

pub struct SiteAssistant {
    sites: Arc<dyn SiteStore>,
    trainer: ModelTrainer,
    resolver: QueryResolver,
    knowledge: KnowledgeHandle,
}

impl SiteAssistant {
    pub fn new(
        engine: Arc<dyn IntentEngine>,
        sites: Arc<dyn SiteStore>,
        models: ModelStore,
        knowledge: KnowledgeHandle,
        synthesizer: CorpusSynthesizer,
    ) -> Self {
        let cache = ModelCache::new();

        let trainer = ModelTrainer::new(
            Arc::clone(&engine),
            models.clone(),
            Arc::clone(&sites),
            knowledge.clone(),
            cache.clone(),
        )
        .with_synthesizer(synthesizer);

        let resolver = QueryResolver::new(engine, models, cache, knowledge.clone());

        Self {
            sites,
            trainer,
            resolver,
            knowledge,
        }
    }

    /// Build from settings with the bundled keyword engine and file storage
    pub fn from_settings(settings: &Settings) -> Self {
        let engine = Arc::new(KeywordEngine::new(settings.nlu.min_confidence));
        let sites = Arc::new(FileSiteStore::new(&settings.storage.sites_dir));
        let models = ModelStore::new(&settings.storage.models_dir);
        let knowledge = KnowledgeHandle::from_path(&settings.knowledge.path);
        let synthesizer = CorpusSynthesizer::new(SynthesisOptions::from(&settings.nlu));

        Self::new(engine, sites, models, knowledge, synthesizer)
    }

    /// Store the site record, then train its model from the stored copy
    pub async fn train(&self, site_id: &SiteId, record: &SiteRecord) -> Result<TrainOutcome> {
        self.sites.save(site_id, record).await?;
        Ok(self.trainer.train_site(site_id).await?)
    }

    pub async fn resolve(&self, site_id: &SiteId, query: &str) -> Result<ResolutionResult> {
        self.resolver.resolve(site_id, query).await
    }

    /// Stored record for `site_id`, `None` if unknown
    pub async fn site(&self, site_id: &SiteId) -> Result<Option<SiteRecord>> {
        Ok(self.sites.load(site_id).await?)
    }

    pub fn knowledge(&self) -> &KnowledgeHandle {
        &self.knowledge
    }
}

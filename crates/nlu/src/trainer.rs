//! Per-site model training
//!
//! Synthesis runs outside any lock. Fitting and writing the artifact are
//! serialized per site; different sites train in parallel.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use serde::Serialize;
use site_assistant_core::{SiteId, SiteRecord, TrainingCorpus};
use site_assistant_knowledge::KnowledgeHandle;
use site_assistant_persistence::{ModelStore, SiteStore};
use tokio::sync::Mutex;

use crate::{CorpusSynthesizer, IntentEngine, ModelCache, NluError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainStatus {
    Trained,
}

/// Result of a successful training run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainOutcome {
    pub status: TrainStatus,
    pub site_id: SiteId,
}

/// Trains and persists one model per site
pub struct ModelTrainer {
    engine: Arc<dyn IntentEngine>,
    synthesizer: CorpusSynthesizer,
    models: ModelStore,
    sites: Arc<dyn SiteStore>,
    knowledge: KnowledgeHandle,
    cache: ModelCache,
    locks: DashMap<SiteId, Arc<Mutex<()>>>,
}

impl ModelTrainer {
    pub fn new(
        engine: Arc<dyn IntentEngine>,
        models: ModelStore,
        sites: Arc<dyn SiteStore>,
        knowledge: KnowledgeHandle,
        cache: ModelCache,
    ) -> Self {
        Self {
            engine,
            synthesizer: CorpusSynthesizer::default(),
            models,
            sites,
            knowledge,
            cache,
            locks: DashMap::new(),
        }
    }

    pub fn with_synthesizer(mut self, synthesizer: CorpusSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    /// Retrain from the stored site record
    pub async fn train_site(&self, site_id: &SiteId) -> Result<TrainOutcome, NluError> {
        let record = self
            .sites
            .load(site_id)
            .await?
            .ok_or_else(|| NluError::SiteNotFound(site_id.clone()))?;

        self.train_record(site_id, &record).await
    }

    /// Synthesize a corpus for `record` and train on it
    pub async fn train_record(
        &self,
        site_id: &SiteId,
        record: &SiteRecord,
    ) -> Result<TrainOutcome, NluError> {
        let kb = self.knowledge.get().await?;
        let corpus = self.synthesizer.synthesize_record(record, &kb);
        self.train(site_id, &corpus).await
    }

    /// Fit `corpus` and atomically replace the site's artifact
    pub async fn train(
        &self,
        site_id: &SiteId,
        corpus: &TrainingCorpus,
    ) -> Result<TrainOutcome, NluError> {
        let lock = self.site_lock(site_id);
        let _guard = lock.lock().await;

        let started = Instant::now();
        tracing::info!(
            site_id = %site_id,
            engine = self.engine.name(),
            utterances = corpus.utterances.len(),
            "Training model"
        );

        let artifact = self.engine.train(corpus).await?;
        self.models.write(site_id, artifact).await?;
        self.cache.invalidate(site_id);

        tracing::info!(
            site_id = %site_id,
            duration_ms = started.elapsed().as_millis() as u64,
            "Training complete"
        );

        Ok(TrainOutcome {
            status: TrainStatus::Trained,
            site_id: site_id.clone(),
        })
    }

    fn site_lock(&self, site_id: &SiteId) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(site_id.clone()).or_default().value())
    }

    pub fn models(&self) -> &ModelStore {
        &self.models
    }

    pub fn engine(&self) -> &Arc<dyn IntentEngine> {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeywordEngine;
    use site_assistant_core::{Page, SiteMetadata};
    use site_assistant_knowledge::KnowledgeBase;
    use site_assistant_persistence::FileSiteStore;
    use tempfile::TempDir;

    fn trainer(dir: &TempDir) -> (ModelTrainer, Arc<FileSiteStore>) {
        let sites = Arc::new(FileSiteStore::new(dir.path().join("sites")));
        let trainer = ModelTrainer::new(
            Arc::new(KeywordEngine::default()),
            ModelStore::new(dir.path().join("models")),
            sites.clone(),
            KnowledgeHandle::preloaded(KnowledgeBase::empty()),
            ModelCache::new(),
        );
        (trainer, sites)
    }

    fn record() -> SiteRecord {
        SiteRecord {
            routing_intents: Vec::new(),
            site_metadata: SiteMetadata::with_pages(vec![Page::new("Dashboard")]),
        }
    }

    #[tokio::test]
    async fn test_train_site_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let (trainer, sites) = trainer(&dir);
        let site = SiteId::parse("portal").unwrap();

        sites.save(&site, &record()).await.unwrap();
        let outcome = trainer.train_site(&site).await.unwrap();

        assert_eq!(outcome.status, TrainStatus::Trained);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({ "status": "trained", "siteId": "portal" })
        );
        assert!(dir.path().join("models/portal.nlp.json").exists());
    }

    #[tokio::test]
    async fn test_train_unknown_site_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (trainer, _) = trainer(&dir);
        let site = SiteId::parse("ghost").unwrap();

        let err = trainer.train_site(&site).await.unwrap_err();
        assert_eq!(err.to_string(), "Site data for siteId 'ghost' not found.");
        assert!(matches!(
            site_assistant_core::Error::from(err),
            site_assistant_core::Error::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_retrain_invalidates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let (trainer, _) = trainer(&dir);
        let site = SiteId::parse("portal").unwrap();

        trainer.train_record(&site, &record()).await.unwrap();
        let bytes = trainer.models().read(&site).await.unwrap().unwrap();
        let generation = trainer.cache.generation(&site);
        assert!(trainer
            .cache
            .insert(site.clone(), generation, trainer.engine().load(&bytes).unwrap()));

        trainer.train_record(&site, &record()).await.unwrap();
        assert!(trainer.cache.get(&site).is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_training_same_site() {
        let dir = tempfile::tempdir().unwrap();
        let (trainer, _) = trainer(&dir);
        let trainer = Arc::new(trainer);
        let site = SiteId::parse("portal").unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let trainer = Arc::clone(&trainer);
                let site = site.clone();
                tokio::spawn(async move {
                    let record = SiteRecord {
                        routing_intents: Vec::new(),
                        site_metadata: SiteMetadata::with_pages(vec![Page::new(format!(
                            "Page {}",
                            i
                        ))]),
                    };
                    trainer.train_record(&site, &record).await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // the final artifact is complete and loadable
        let bytes = trainer.models().read(&site).await.unwrap().unwrap();
        assert!(trainer.engine().load(&bytes).is_ok());
        let entries = std::fs::read_dir(dir.path().join("models")).unwrap().count();
        assert_eq!(entries, 1);
    }
}

//! Query resolution
//!
//! Loads the site's model (cached), runs inference, classifies the intent
//! once and attaches knowledge base metadata for concept matches.

use std::sync::Arc;
use std::time::Instant;

use site_assistant_core::{
    ConceptMetadata, Error, ResolutionResult, ResolvedIntent, Result, SiteId,
};
use site_assistant_knowledge::KnowledgeHandle;
use site_assistant_nlu::{IntentEngine, IntentModel, ModelCache, NluError};
use site_assistant_persistence::ModelStore;

pub struct QueryResolver {
    engine: Arc<dyn IntentEngine>,
    models: ModelStore,
    cache: ModelCache,
    knowledge: KnowledgeHandle,
}

impl QueryResolver {
    pub fn new(
        engine: Arc<dyn IntentEngine>,
        models: ModelStore,
        cache: ModelCache,
        knowledge: KnowledgeHandle,
    ) -> Self {
        Self {
            engine,
            models,
            cache,
            knowledge,
        }
    }

    /// Resolve `query` against the model trained for `site_id`
    pub async fn resolve(&self, site_id: &SiteId, query: &str) -> Result<ResolutionResult> {
        if query.trim().is_empty() {
            return Err(Error::Validation("query must not be empty".to_string()));
        }

        let started = Instant::now();
        let model = self.model(site_id).await?;
        let inference = model.process(query);
        let resolved = ResolvedIntent::classify(&inference);

        let metadata = match &resolved {
            ResolvedIntent::Concept { key } => {
                let kb = self.knowledge.get().await?;
                kb.get(key).map(ConceptMetadata::from)
            }
            _ => None,
        };

        tracing::debug!(
            site_id = %site_id,
            intent = %inference.intent,
            score = inference.score,
            entities = inference.entities.len(),
            enriched = metadata.is_some(),
            duration_us = started.elapsed().as_micros() as u64,
            "Resolved query"
        );

        Ok(ResolutionResult {
            site_id: site_id.clone(),
            query: query.to_string(),
            intent: inference.intent,
            score: inference.score,
            answer: inference.answer,
            entities: inference.entities,
            metadata,
            resolved,
        })
    }

    async fn model(&self, site_id: &SiteId) -> Result<Arc<dyn IntentModel>> {
        if let Some(model) = self.cache.get(site_id) {
            return Ok(model);
        }

        let generation = self.cache.generation(site_id);
        let bytes = self
            .models
            .read(site_id)
            .await
            .map_err(NluError::from)?
            .ok_or_else(|| NluError::ModelNotFound(site_id.clone()))?;

        let model = self.engine.load(&bytes)?;
        if self.cache.insert(site_id.clone(), generation, Arc::clone(&model)) {
            tracing::debug!(site_id = %site_id, "Cached model");
        }

        Ok(model)
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_assistant_core::{Concept, ConceptKey, FaqEntry, Page, SiteMetadata, SiteRecord};
    use site_assistant_knowledge::KnowledgeBase;
    use site_assistant_nlu::{CorpusSynthesizer, KeywordEngine};

    fn knowledge() -> KnowledgeBase {
        KnowledgeBase::from_concepts(vec![(
            "Member ID Lookup".to_string(),
            Concept {
                description: Some("Find a member by ID".to_string()),
                intent_examples: vec!["how do I look up a member id".to_string()],
                faq: vec![FaqEntry {
                    question: "Where is it?".to_string(),
                    answer: "On the insurance card".to_string(),
                }],
                categories: serde_json::json!(["members"]),
                priority: Some(serde_json::json!(1)),
                ..Default::default()
            },
        )])
        .unwrap()
    }

    async fn resolver(dir: &tempfile::TempDir, site: &SiteId) -> QueryResolver {
        let engine: Arc<dyn IntentEngine> = Arc::new(KeywordEngine::default());
        let models = ModelStore::new(dir.path());
        let kb = knowledge();

        let record = SiteRecord {
            routing_intents: Vec::new(),
            site_metadata: SiteMetadata::with_pages(vec![
                Page::new("Dashboard"),
                Page::new("Claims").with_url("/claims/:claimId"),
            ]),
        };
        let corpus = CorpusSynthesizer::default().synthesize_record(&record, &kb);
        let artifact = engine.train(&corpus).await.unwrap();
        models.write(site, artifact).await.unwrap();

        QueryResolver::new(engine, models, ModelCache::new(), KnowledgeHandle::preloaded(kb))
    }

    #[tokio::test]
    async fn test_navigation_query() {
        let dir = tempfile::tempdir().unwrap();
        let site = SiteId::parse("portal").unwrap();
        let resolver = resolver(&dir, &site).await;

        let result = resolver.resolve(&site, "go to dashboard").await.unwrap();

        assert_eq!(result.intent, "navigate_to_page");
        assert_eq!(
            result.resolved,
            ResolvedIntent::Navigation {
                page: Some("Dashboard".to_string())
            }
        );
        assert!(result.metadata.is_none());
    }

    #[tokio::test]
    async fn test_navigation_with_param() {
        let dir = tempfile::tempdir().unwrap();
        let site = SiteId::parse("portal").unwrap();
        let resolver = resolver(&dir, &site).await;

        let result = resolver.resolve(&site, "open claims page claim 4411").await.unwrap();

        assert_eq!(result.intent, "navigate_to_page");
        let claim = result.entities.iter().find(|e| e.entity == "claimId").unwrap();
        assert_eq!(claim.source_text, "4411");
    }

    #[tokio::test]
    async fn test_concept_query_is_enriched() {
        let dir = tempfile::tempdir().unwrap();
        let site = SiteId::parse("portal").unwrap();
        let resolver = resolver(&dir, &site).await;

        let result = resolver
            .resolve(&site, "how do I look up a member id")
            .await
            .unwrap();

        assert_eq!(result.intent, "concept.member_id_lookup");
        assert_eq!(
            result.resolved.concept_key(),
            Some(&ConceptKey::normalize("Member ID Lookup"))
        );
        assert_eq!(result.answer.as_deref(), Some("On the insurance card"));

        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.description.as_deref(), Some("Find a member by ID"));
        assert_eq!(metadata.categories, serde_json::json!(["members"]));
        assert_eq!(metadata.priority, Some(serde_json::json!(1)));
    }

    #[tokio::test]
    async fn test_response_wire_format() {
        let dir = tempfile::tempdir().unwrap();
        let site = SiteId::parse("portal").unwrap();
        let resolver = resolver(&dir, &site).await;

        let result = resolver.resolve(&site, "tell me a joke").await.unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["siteId"], "portal");
        assert_eq!(json["intent"], "None");
        assert!(json["metadata"].is_null());
        assert!(json["answer"].is_null());
        assert!(json.get("resolved").is_none());
    }

    #[tokio::test]
    async fn test_untrained_site_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let site = SiteId::parse("portal").unwrap();
        let resolver = resolver(&dir, &site).await;

        let other = SiteId::parse("other").unwrap();
        let err = resolver.resolve(&other, "go to dashboard").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_model_is_cached_after_first_query() {
        let dir = tempfile::tempdir().unwrap();
        let site = SiteId::parse("portal").unwrap();
        let resolver = resolver(&dir, &site).await;

        assert!(resolver.cache().is_empty());
        resolver.resolve(&site, "go to dashboard").await.unwrap();
        assert_eq!(resolver.cache().len(), 1);

        // served from cache even after the artifact disappears
        std::fs::remove_file(dir.path().join("portal.nlp.json")).unwrap();
        assert!(resolver.resolve(&site, "go to claims").await.is_ok());
    }
}

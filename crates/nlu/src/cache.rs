//! Loaded model cache shared by the trainer and the resolver

use std::sync::Arc;

use dashmap::DashMap;
use site_assistant_core::SiteId;

use crate::IntentModel;

/// Site id -> loaded model
///
/// Read-mostly. Each site carries a generation that the trainer bumps when
/// it replaces the artifact; a model loaded under an older generation is
/// never cached, so a retrain cannot be shadowed by an in-flight reload.
#[derive(Clone, Default)]
pub struct ModelCache {
    entries: Arc<DashMap<SiteId, Entry>>,
}

#[derive(Default)]
struct Entry {
    generation: u64,
    model: Option<Arc<dyn IntentModel>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, site_id: &SiteId) -> Option<Arc<dyn IntentModel>> {
        self.entries
            .get(site_id)
            .and_then(|entry| entry.model.as_ref().map(Arc::clone))
    }

    /// Current generation; read it before loading the artifact
    pub fn generation(&self, site_id: &SiteId) -> u64 {
        self.entries.get(site_id).map_or(0, |entry| entry.generation)
    }

    /// Cache `model` if no retrain happened since `generation` was read
    pub fn insert(&self, site_id: SiteId, generation: u64, model: Arc<dyn IntentModel>) -> bool {
        let mut entry = self.entries.entry(site_id).or_default();
        if entry.generation != generation {
            return false;
        }
        entry.model = Some(model);
        true
    }

    pub fn invalidate(&self, site_id: &SiteId) {
        let mut entry = self.entries.entry(site_id.clone()).or_default();
        entry.generation += 1;
        if entry.model.take().is_some() {
            tracing::debug!(site_id = %site_id, "Invalidated cached model");
        }
    }

    /// Number of sites with a cached model
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.model.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("cached", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_assistant_core::Inference;

    struct Fixed;

    impl IntentModel for Fixed {
        fn process(&self, _query: &str) -> Inference {
            Inference::unrecognized()
        }
    }

    #[test]
    fn test_insert_get_invalidate() {
        let cache = ModelCache::new();
        let site = SiteId::parse("portal").unwrap();

        assert!(cache.get(&site).is_none());
        assert!(cache.insert(site.clone(), 0, Arc::new(Fixed)));
        assert!(cache.get(&site).is_some());

        let shared = cache.clone();
        shared.invalidate(&site);
        assert!(cache.is_empty());
        assert_eq!(cache.generation(&site), 1);
    }

    #[test]
    fn test_stale_generation_not_cached() {
        let cache = ModelCache::new();
        let site = SiteId::parse("portal").unwrap();

        let before = cache.generation(&site);
        cache.invalidate(&site);

        assert!(!cache.insert(site.clone(), before, Arc::new(Fixed)));
        assert!(cache.get(&site).is_none());
    }
}

//! Site record storage

use std::path::PathBuf;

use async_trait::async_trait;
use site_assistant_core::{SiteId, SiteRecord};

use crate::atomic::write_atomic;
use crate::PersistenceError;

/// Durable mapping site id -> site record
#[async_trait]
pub trait SiteStore: Send + Sync {
    /// Create or replace the record for `site_id`
    async fn save(&self, site_id: &SiteId, record: &SiteRecord) -> Result<(), PersistenceError>;

    /// Load the record for `site_id`, `None` if it was never saved
    async fn load(&self, site_id: &SiteId) -> Result<Option<SiteRecord>, PersistenceError>;
}

/// One pretty-printed JSON file per site
#[derive(Debug, Clone)]
pub struct FileSiteStore {
    dir: PathBuf,
}

impl FileSiteStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<dir>/<siteId>.json`; the id is validated so it cannot escape `dir`
    pub fn path_for(&self, site_id: &SiteId) -> PathBuf {
        self.dir.join(format!("{}.json", site_id))
    }
}

#[async_trait]
impl SiteStore for FileSiteStore {
    async fn save(&self, site_id: &SiteId, record: &SiteRecord) -> Result<(), PersistenceError> {
        let path = self.path_for(site_id);
        let bytes = serde_json::to_vec_pretty(record)?;

        write_atomic(&path, bytes).await?;

        tracing::debug!(site_id = %site_id, path = %path.display(), "Saved site record");
        Ok(())
    }

    async fn load(&self, site_id: &SiteId) -> Result<Option<SiteRecord>, PersistenceError> {
        let path = self.path_for(site_id);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::io(path, e)),
        };

        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_assistant_core::{Page, RoutingIntent, SiteMetadata};

    fn record() -> SiteRecord {
        let mut metadata = SiteMetadata::with_pages(vec![
            Page::new("Dashboard").with_url("/dashboard"),
            Page::new("Claims Detail").with_url("/claims/:claimId"),
        ]);
        metadata
            .extra
            .insert("theme".to_string(), serde_json::json!({ "color": "teal" }));

        SiteRecord {
            routing_intents: vec![RoutingIntent {
                name: "greeting".to_string(),
                phrases: vec!["hello".to_string(), "hi there".to_string()],
            }],
            site_metadata: metadata,
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSiteStore::new(dir.path().join("sites"));
        let site = SiteId::parse("portal").unwrap();

        store.save(&site, &record()).await.unwrap();

        let loaded = store.load(&site).await.unwrap().unwrap();
        assert_eq!(loaded, record());
        assert_eq!(loaded.site_metadata.extra["theme"]["color"], "teal");
    }

    #[tokio::test]
    async fn test_file_is_pretty_camel_case_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSiteStore::new(dir.path());
        let site = SiteId::parse("portal").unwrap();

        store.save(&site, &record()).await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("portal.json")).unwrap();
        assert!(text.contains("\n  \"routingIntents\""));
        assert!(text.contains("\"siteMetadata\""));
    }

    #[tokio::test]
    async fn test_unknown_site_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSiteStore::new(dir.path());
        let site = SiteId::parse("missing").unwrap();

        assert!(store.load(&site).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSiteStore::new(dir.path());
        let site = SiteId::parse("portal").unwrap();

        store.save(&site, &record()).await.unwrap();
        store.save(&site, &SiteRecord::default()).await.unwrap();

        let loaded = store.load(&site).await.unwrap().unwrap();
        assert!(loaded.site_metadata.pages.is_empty());
    }
}

//! Trained model artifact storage

use std::path::PathBuf;

use site_assistant_core::SiteId;

use crate::atomic::write_atomic;
use crate::PersistenceError;

/// Suffix of model artifacts
pub const MODEL_SUFFIX: &str = ".nlp.json";

/// Artifacts at `<dir>/<siteId>.nlp.json`
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, site_id: &SiteId) -> PathBuf {
        self.dir.join(format!("{}{}", site_id, MODEL_SUFFIX))
    }

    /// Artifact bytes, `None` when the site has never been trained
    pub async fn read(&self, site_id: &SiteId) -> Result<Option<Vec<u8>>, PersistenceError> {
        let path = self.path_for(site_id);

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::io(path, e)),
        }
    }

    /// Replace the artifact for `site_id`
    pub async fn write(&self, site_id: &SiteId, bytes: Vec<u8>) -> Result<PathBuf, PersistenceError> {
        let path = self.path_for(site_id);
        let size = bytes.len();

        write_atomic(&path, bytes).await?;

        tracing::info!(
            site_id = %site_id,
            path = %path.display(),
            bytes = size,
            "Wrote model artifact"
        );
        Ok(path)
    }
}

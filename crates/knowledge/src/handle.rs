//! Process-scoped knowledge base handle
//!
//! The knowledge base is read at most once per process. Concurrent first
//! callers wait on the same load; later callers get the cached `Arc`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::{KnowledgeBase, KnowledgeError, KnowledgeLoader};

/// Lazily loaded, shared knowledge base
#[derive(Debug, Clone)]
pub struct KnowledgeHandle {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: Option<PathBuf>,
    cell: OnceCell<Arc<KnowledgeBase>>,
    loads: AtomicUsize,
}

impl KnowledgeHandle {
    /// Handle that loads `path` on first use
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: Some(path.into()),
                cell: OnceCell::new(),
                loads: AtomicUsize::new(0),
            }),
        }
    }

    /// Handle over an already-built knowledge base
    pub fn preloaded(kb: KnowledgeBase) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: None,
                cell: OnceCell::new_with(Some(Arc::new(kb))),
                loads: AtomicUsize::new(0),
            }),
        }
    }

    /// The knowledge base, loading it on first call
    ///
    /// A failed load is not cached; the next call retries.
    pub async fn get(&self) -> Result<Arc<KnowledgeBase>, KnowledgeError> {
        let kb = self
            .inner
            .cell
            .get_or_try_init(|| async {
                let Some(path) = self.inner.path.as_deref() else {
                    return Ok(Arc::new(KnowledgeBase::empty()));
                };

                self.inner.loads.fetch_add(1, Ordering::SeqCst);
                KnowledgeLoader::load_file(path).await.map(Arc::new)
            })
            .await?;

        Ok(Arc::clone(kb))
    }

    /// Number of times the backing file has been read
    pub fn load_count(&self) -> usize {
        self.inner.loads.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.cell.initialized()
    }
}

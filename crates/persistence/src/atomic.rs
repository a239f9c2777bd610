//! Atomic file replacement

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::PersistenceError;

/// Write `bytes` to `path` via a sibling temp file and rename
///
/// Creates the parent directory if needed. On failure the temp file is
/// removed and any previous content at `path` is left untouched.
pub async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<(), PersistenceError> {
    let path: PathBuf = path.to_path_buf();

    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, &bytes))
        .await
        .map_err(|e| PersistenceError::Task(e.to_string()))?
}

fn write_atomic_blocking(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PersistenceError::io(dir, e))?;
    tmp.write_all(bytes)
        .map_err(|e| PersistenceError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| PersistenceError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| PersistenceError::io(path, e.error))?;

    Ok(())
}

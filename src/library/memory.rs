//! In-process asset library
//!
//! Keeps every saved asset in memory. Useful for embedding the clipboard in a
//! host that supplies its own persistence, and for tests: the library can be
//! disposed or told to reject writes to exercise failure paths.

use super::{AssetId, AssetInfo, AssetLibrary, LibraryError};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug)]
struct StoredAsset {
    id: AssetId,
    name: String,
    data: Vec<u8>,
    saved_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    assets: Vec<StoredAsset>,
    next_id: i64,
    disposed: bool,
    reject_writes: bool,
    reads: usize,
    writes: usize,
}

/// Asset library held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryLibrary {
    inner: Mutex<Inner>,
}

impl MemoryLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the library; every later call fails with [`LibraryError::Disposed`]
    pub fn dispose(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.disposed = true;
        }
    }

    /// Make subsequent saves fail with [`LibraryError::InvalidState`]
    pub fn reject_writes(&self, reject: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.reject_writes = reject;
        }
    }

    /// Number of successful asset reads so far
    pub fn read_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.reads).unwrap_or(0)
    }

    /// Number of successful asset saves so far
    pub fn write_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.writes).unwrap_or(0)
    }

    /// Total number of assets held, regardless of name
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.assets.len()).unwrap_or(0)
    }

    /// Whether the library holds no assets
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, LibraryError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| LibraryError::InvalidState("library lock poisoned".to_string()))?;
        if inner.disposed {
            return Err(LibraryError::Disposed);
        }
        Ok(inner)
    }
}

impl AssetLibrary for MemoryLibrary {
    fn find_last(&self, name: &str) -> Result<Option<AssetId>, LibraryError> {
        let inner = self.lock()?;
        Ok(inner
            .assets
            .iter()
            .rev()
            .find(|asset| asset.name == name)
            .map(|asset| asset.id))
    }

    fn read(&self, id: AssetId) -> Result<Vec<u8>, LibraryError> {
        let mut inner = self.lock()?;
        let data = inner
            .assets
            .iter()
            .find(|asset| asset.id == id)
            .map(|asset| asset.data.clone())
            .ok_or(LibraryError::Missing(id))?;
        inner.reads += 1;
        Ok(data)
    }

    fn save(&self, name: &str, data: &[u8]) -> Result<AssetId, LibraryError> {
        let mut inner = self.lock()?;
        if inner.reject_writes {
            return Err(LibraryError::InvalidState(
                "library is not accepting new assets".to_string(),
            ));
        }

        inner.next_id += 1;
        let id = AssetId(inner.next_id);
        inner.assets.push(StoredAsset {
            id,
            name: name.to_string(),
            data: data.to_vec(),
            saved_at: Utc::now(),
        });
        inner.writes += 1;

        debug!("Saved asset {} ({} bytes) as {}", name, data.len(), id);
        Ok(id)
    }

    fn list(&self, name: &str) -> Result<Vec<AssetInfo>, LibraryError> {
        let inner = self.lock()?;
        Ok(inner
            .assets
            .iter()
            .filter(|asset| asset.name == name)
            .map(|asset| AssetInfo {
                id: asset.id,
                name: asset.name.clone(),
                size: asset.data.len(),
                saved_at: asset.saved_at,
            })
            .collect())
    }
}

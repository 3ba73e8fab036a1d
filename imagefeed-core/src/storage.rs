use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::feed::{CachedFeed, LocalFeedImage};
use crate::store::FeedStore;

#[derive(Debug, Default)]
pub struct InMemoryFeedStore {
    inner: RwLock<Option<CachedFeed>>,
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    async fn delete_cached_feed(&self) -> Result<(), StoreError> {
        *self.inner.write().await = None;
        Ok(())
    }

    async fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        *self.inner.write().await = Some(CachedFeed { feed, timestamp });
        Ok(())
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, StoreError> {
        Ok(self.inner.read().await.clone())
    }
}

/// Feed snapshot kept as one JSON document on disk.
#[derive(Debug)]
pub struct JsonFeedStore {
    path: PathBuf,
    // guards the file, not data: readers share, writers are exclusive
    lock: RwLock<()>,
}

impl JsonFeedStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FeedStore for JsonFeedStore {
    async fn delete_cached_feed(&self) -> Result<(), StoreError> {
        let _guard = self.lock.write().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cached feed to delete");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&CachedFeed { feed, timestamp })?;
        let _guard = self.lock.write().await;
        write_atomically(&self.path, &bytes).await
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, StoreError> {
        let _guard = self.lock.read().await;
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

/// Writes to a sibling temp file and renames it over `path`, so readers see
/// either the old contents or the new ones.
pub(crate) async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

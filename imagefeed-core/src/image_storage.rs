use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use url::Url;

use crate::error::StoreError;
use crate::storage::write_atomically;
use crate::store::FeedImageDataStore;

#[derive(Debug, Default)]
pub struct InMemoryImageDataStore {
    inner: RwLock<HashMap<Url, Bytes>>,
}

impl InMemoryImageDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl FeedImageDataStore for InMemoryImageDataStore {
    async fn insert(&self, data: Bytes, url: &Url) -> Result<(), StoreError> {
        self.inner.write().await.insert(url.clone(), data);
        Ok(())
    }

    async fn retrieve(&self, url: &Url) -> Result<Option<Bytes>, StoreError> {
        Ok(self.inner.read().await.get(url).cloned())
    }
}

/// Image bytes stored one file per URL under a directory.
///
/// Entries never expire; they are overwritten on refetch and removed only by
/// [`FileImageDataStore::clear`].
#[derive(Debug)]
pub struct FileImageDataStore {
    dir: PathBuf,
    lock: RwLock<()>,
}

impl FileImageDataStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        }
    }

    pub fn entry_path(&self, url: &Url) -> PathBuf {
        let digest = Sha256::digest(url.as_str().as_bytes());
        self.dir.join(hex::encode(digest))
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.write().await;
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl FeedImageDataStore for FileImageDataStore {
    async fn insert(&self, data: Bytes, url: &Url) -> Result<(), StoreError> {
        let path = self.entry_path(url);
        let _guard = self.lock.write().await;
        write_atomically(&path, &data).await
    }

    async fn retrieve(&self, url: &Url) -> Result<Option<Bytes>, StoreError> {
        let path = self.entry_path(url);
        let _guard = self.lock.read().await;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

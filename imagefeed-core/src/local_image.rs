use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use url::Url;

use crate::error::{LoadError, StoreError};
use crate::loader::{ImageDataCache, ImageDataLoader};
use crate::store::FeedImageDataStore;

/// Cache-side image loader: a miss is an error so a fallback can take over.
pub struct LocalImageDataLoader {
    store: Arc<dyn FeedImageDataStore>,
}

impl LocalImageDataLoader {
    pub fn new(store: Arc<dyn FeedImageDataStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ImageDataLoader for LocalImageDataLoader {
    async fn load_image_data(&self, url: &Url) -> Result<Bytes, LoadError> {
        match self.store.retrieve(url).await? {
            Some(data) => {
                debug!(%url, len = data.len(), "image data cache hit");
                Ok(data)
            }
            None => {
                debug!(%url, "image data cache miss");
                Err(LoadError::NotFound(url.clone()))
            }
        }
    }
}

#[async_trait]
impl ImageDataCache for LocalImageDataLoader {
    async fn save(&self, data: Bytes, url: &Url) -> Result<(), StoreError> {
        self.store.insert(data, url).await
    }
}

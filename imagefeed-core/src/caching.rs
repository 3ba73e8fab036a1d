use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::runtime::Handle;
use tracing::warn;
use url::Url;

use crate::error::LoadError;
use crate::loader::{ImageDataCache, ImageDataLoader, ResourceCache, ResourceLoader};

/// Decorates a loader so that every success is also written to a cache.
///
/// The write is spawned and never awaited: the result reaches the caller
/// whatever the cache does, and a failed write is only logged.
pub struct CachingLoader<L, C: ?Sized> {
    decoratee: L,
    cache: Arc<C>,
}

impl<L, C: ?Sized> CachingLoader<L, C> {
    pub fn new(decoratee: L, cache: Arc<C>) -> Self {
        Self { decoratee, cache }
    }
}

#[async_trait]
impl<L, C> ResourceLoader for CachingLoader<L, C>
where
    L: ResourceLoader,
    L::Resource: Clone + 'static,
    C: ResourceCache<L::Resource> + ?Sized + 'static,
{
    type Resource = L::Resource;

    async fn load(&self) -> Result<Self::Resource, LoadError> {
        let resource = self.decoratee.load().await?;
        let cache = Arc::clone(&self.cache);
        let copy = resource.clone();
        spawn_cache_write(async move {
            if let Err(err) = cache.save(copy).await {
                warn!(error = %err, "failed to cache loaded resource");
            }
        });
        Ok(resource)
    }
}

pub struct CachingImageDataLoader<L, C: ?Sized> {
    decoratee: L,
    cache: Arc<C>,
}

impl<L, C: ?Sized> CachingImageDataLoader<L, C> {
    pub fn new(decoratee: L, cache: Arc<C>) -> Self {
        Self { decoratee, cache }
    }
}

#[async_trait]
impl<L, C> ImageDataLoader for CachingImageDataLoader<L, C>
where
    L: ImageDataLoader,
    C: ImageDataCache + ?Sized + 'static,
{
    async fn load_image_data(&self, url: &Url) -> Result<Bytes, LoadError> {
        let data = self.decoratee.load_image_data(url).await?;
        let cache = Arc::clone(&self.cache);
        let key = url.clone();
        // Bytes clones share the buffer
        let copy = data.clone();
        spawn_cache_write(async move {
            if let Err(err) = cache.save(copy, &key).await {
                warn!(url = %key, error = %err, "failed to cache image data");
            }
        });
        Ok(data)
    }
}

pub(crate) fn spawn_cache_write<F>(write: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(write);
        }
        Err(_) => warn!("no tokio runtime available, skipping cache write"),
    }
}

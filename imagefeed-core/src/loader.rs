//! Loader and cache seams shared by the remote, local and composite loaders.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::{LoadError, StoreError};

/// Fetches a whole resource (the feed, a comment list).
///
/// Dropping the returned future cancels the load; no result is produced for it.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    type Resource: Send;

    async fn load(&self) -> Result<Self::Resource, LoadError>;
}

/// Fetches a binary blob keyed by its URL.
#[async_trait]
pub trait ImageDataLoader: Send + Sync {
    async fn load_image_data(&self, url: &Url) -> Result<Bytes, LoadError>;
}

/// Sink that persists a successfully loaded resource.
#[async_trait]
pub trait ResourceCache<R>: Send + Sync {
    async fn save(&self, resource: R) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ImageDataCache: Send + Sync {
    async fn save(&self, data: Bytes, url: &Url) -> Result<(), StoreError>;
}

#[async_trait]
impl<T> ResourceLoader for Arc<T>
where
    T: ResourceLoader + ?Sized,
{
    type Resource = T::Resource;

    async fn load(&self) -> Result<Self::Resource, LoadError> {
        (**self).load().await
    }
}

#[async_trait]
impl<T> ImageDataLoader for Arc<T>
where
    T: ImageDataLoader + ?Sized,
{
    async fn load_image_data(&self, url: &Url) -> Result<Bytes, LoadError> {
        (**self).load_image_data(url).await
    }
}

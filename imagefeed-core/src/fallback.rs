use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use url::Url;

use crate::error::LoadError;
use crate::loader::{ImageDataLoader, ResourceLoader};

/// Tries `primary`, and only after it fails, `fallback`.
///
/// A success from either side is forwarded untouched. When both fail the
/// caller sees the fallback's error. The fallback is started from the same
/// future that observed the primary failure, so dropping (cancelling) the load
/// before that point means it is never started.
pub struct FallbackLoader<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackLoader<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P, F> ResourceLoader for FallbackLoader<P, F>
where
    P: ResourceLoader,
    F: ResourceLoader<Resource = P::Resource>,
{
    type Resource = P::Resource;

    async fn load(&self) -> Result<Self::Resource, LoadError> {
        match self.primary.load().await {
            Ok(resource) => Ok(resource),
            Err(err) => {
                debug!(error = %err, "primary loader failed, falling back");
                self.fallback.load().await
            }
        }
    }
}

#[async_trait]
impl<P, F> ImageDataLoader for FallbackLoader<P, F>
where
    P: ImageDataLoader,
    F: ImageDataLoader,
{
    async fn load_image_data(&self, url: &Url) -> Result<Bytes, LoadError> {
        match self.primary.load_image_data(url).await {
            Ok(data) => Ok(data),
            Err(err) => {
                debug!(%url, error = %err, "primary image loader failed, falling back");
                self.fallback.load_image_data(url).await
            }
        }
    }
}

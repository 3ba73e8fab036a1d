use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use url::Url;

use crate::error::StoreError;
use crate::feed::{CachedFeed, LocalFeedImage};

/// Persistence engine for the feed snapshot.
///
/// Implementations must serialize mutations against one logical store: an
/// insert or delete never interleaves with another write, and reads never
/// observe a write in progress.
#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn delete_cached_feed(&self) -> Result<(), StoreError>;

    /// Replaces any existing snapshot wholesale.
    async fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn retrieve(&self) -> Result<Option<CachedFeed>, StoreError>;
}

/// Persistence engine for image bytes, one entry per URL.
#[async_trait]
pub trait FeedImageDataStore: Send + Sync {
    async fn insert(&self, data: Bytes, url: &Url) -> Result<(), StoreError>;

    async fn retrieve(&self, url: &Url) -> Result<Option<Bytes>, StoreError>;
}

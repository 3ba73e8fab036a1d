use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{LoadError, StoreError};
use crate::feed::{to_local, to_models, CachedFeed, FeedImage};
use crate::loader::{ResourceCache, ResourceLoader};
use crate::policy::CachePolicy;
use crate::store::FeedStore;

/// Read/write façade over the feed snapshot store.
///
/// Holds no feed state itself. An expired snapshot loads as an empty feed, not
/// as an error; [`LocalFeedLoader::validate_cache`] is what removes it.
pub struct LocalFeedLoader {
    store: Arc<dyn FeedStore>,
    clock: Clock,
    policy: CachePolicy,
    // loads read under it; save and validation hold it exclusively so the
    // delete+insert pair is never observed half done
    write_gate: RwLock<()>,
}

impl LocalFeedLoader {
    pub fn new(store: Arc<dyn FeedStore>, clock: Clock, policy: CachePolicy) -> Self {
        Self {
            store,
            clock,
            policy,
            write_gate: RwLock::new(()),
        }
    }

    pub async fn load(&self) -> Result<Vec<FeedImage>, LoadError> {
        let _gate = self.write_gate.read().await;
        match self.store.retrieve().await? {
            Some(cache) if self.is_fresh(&cache) => {
                debug!(items = cache.feed.len(), "serving feed from cache");
                Ok(to_models(cache.feed))
            }
            Some(_) => {
                debug!("cached feed expired");
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    /// Replaces the snapshot with `feed`, stamped with the current time.
    pub async fn save(&self, feed: &[FeedImage]) -> Result<(), StoreError> {
        let _gate = self.write_gate.write().await;
        self.store.delete_cached_feed().await?;
        self.store.insert(to_local(feed), (self.clock)()).await
    }

    /// Deletes the snapshot when it cannot be read or has expired.
    pub async fn validate_cache(&self) -> Result<(), StoreError> {
        let _gate = self.write_gate.write().await;
        match self.store.retrieve().await {
            Err(err) => {
                warn!(error = %err, "unreadable feed cache, deleting");
                self.store.delete_cached_feed().await
            }
            Ok(Some(cache)) if !self.is_fresh(&cache) => {
                info!(cached_at = %cache.timestamp, "feed cache expired, deleting");
                self.store.delete_cached_feed().await
            }
            Ok(_) => Ok(()),
        }
    }

    fn is_fresh(&self, cache: &CachedFeed) -> bool {
        let now = (self.clock)().with_timezone(&Local);
        self.policy
            .is_valid(&cache.timestamp.with_timezone(&Local), &now)
    }
}

#[async_trait]
impl ResourceLoader for LocalFeedLoader {
    type Resource = Vec<FeedImage>;

    async fn load(&self) -> Result<Vec<FeedImage>, LoadError> {
        LocalFeedLoader::load(self).await
    }
}

#[async_trait]
impl ResourceCache<Vec<FeedImage>> for LocalFeedLoader {
    async fn save(&self, feed: Vec<FeedImage>) -> Result<(), StoreError> {
        LocalFeedLoader::save(self, &feed).await
    }
}

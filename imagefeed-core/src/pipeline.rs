use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::caching::{spawn_cache_write, CachingImageDataLoader, CachingLoader};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::endpoint::{FeedEndpoint, ImageCommentsEndpoint};
use crate::error::{LoadError, StoreError};
use crate::fallback::FallbackLoader;
use crate::feed::{FeedImage, ImageComment};
use crate::loader::{ImageDataLoader, ResourceLoader};
use crate::local::LocalFeedLoader;
use crate::local_image::LocalImageDataLoader;
use crate::remote::{HttpClient, RemoteImageDataLoader, RemoteLoader};
use crate::store::{FeedImageDataStore, FeedStore};
use crate::task::{publisher, LoadTask};

pub type SharedFeedLoader = Arc<dyn ResourceLoader<Resource = Vec<FeedImage>>>;
pub type SharedImageDataLoader = Arc<dyn ImageDataLoader>;

/// Composition root for the loaders.
///
/// The feed goes remote first and falls back to the cache; image data goes
/// cache first and falls back to the network. Both write remote successes
/// through to their store.
pub struct FeedPipeline {
    client: Arc<dyn HttpClient>,
    base_url: Url,
    endpoint: FeedEndpoint,
    local_feed: Arc<LocalFeedLoader>,
    feed: SharedFeedLoader,
    image_data: SharedImageDataLoader,
}

impl FeedPipeline {
    pub fn new(
        config: &AppConfig,
        client: Arc<dyn HttpClient>,
        feed_store: Arc<dyn FeedStore>,
        image_store: Arc<dyn FeedImageDataStore>,
        clock: Clock,
    ) -> Result<Self, LoadError> {
        let base_url = config.remote.base_url.clone();
        let endpoint = config.feed_endpoint();

        let local_feed = Arc::new(LocalFeedLoader::new(
            feed_store,
            clock,
            config.cache_policy(),
        ));
        let remote_feed = RemoteLoader::feed(Arc::clone(&client), endpoint.get(&base_url, None)?);
        let feed: SharedFeedLoader = Arc::new(FallbackLoader::new(
            CachingLoader::new(remote_feed, Arc::clone(&local_feed)),
            Arc::clone(&local_feed),
        ));

        let local_images = Arc::new(LocalImageDataLoader::new(image_store));
        let image_data: SharedImageDataLoader = Arc::new(FallbackLoader::new(
            Arc::clone(&local_images),
            CachingImageDataLoader::new(RemoteImageDataLoader::new(Arc::clone(&client)), local_images),
        ));

        Ok(Self {
            client,
            base_url,
            endpoint,
            local_feed,
            feed,
            image_data,
        })
    }

    pub fn feed_loader(&self) -> SharedFeedLoader {
        Arc::clone(&self.feed)
    }

    pub fn image_data_loader(&self) -> SharedImageDataLoader {
        Arc::clone(&self.image_data)
    }

    pub async fn load_feed(&self) -> Result<Vec<FeedImage>, LoadError> {
        self.feed.load().await
    }

    /// Appends the remote page after `current` and caches the combined list.
    /// Paging has no offline fallback.
    pub async fn load_more(&self, current: &[FeedImage]) -> Result<Vec<FeedImage>, LoadError> {
        let url = self.endpoint.get(&self.base_url, current.last())?;
        let page = RemoteLoader::feed(Arc::clone(&self.client), url).load().await?;
        debug!(loaded = page.len(), existing = current.len(), "loaded next feed page");

        let mut combined = current.to_vec();
        combined.extend(page);
        let cache = Arc::clone(&self.local_feed);
        let snapshot = combined.clone();
        spawn_cache_write(async move {
            if let Err(err) = cache.save(&snapshot).await {
                warn!(error = %err, "failed to cache paged feed");
            }
        });
        Ok(combined)
    }

    pub async fn load_image_data(&self, url: &Url) -> Result<Bytes, LoadError> {
        self.image_data.load_image_data(url).await
    }

    /// Comments always come from the network and are never cached.
    pub async fn load_comments(&self, image_id: Uuid) -> Result<Vec<ImageComment>, LoadError> {
        let url = ImageCommentsEndpoint::get(&self.base_url, image_id)?;
        RemoteLoader::comments(Arc::clone(&self.client), url)
            .load()
            .await
    }

    /// Lifecycle hook: drops an expired or unreadable feed snapshot.
    pub async fn validate_cache(&self) -> Result<(), StoreError> {
        self.local_feed.validate_cache().await
    }

    pub fn feed_task<F>(&self, completion: F) -> LoadTask
    where
        F: FnOnce(Result<Vec<FeedImage>, LoadError>) + Send + 'static,
    {
        let feed = self.feed_loader();
        LoadTask::spawn(async move { feed.load().await }, completion)
    }

    pub fn image_data_task<F>(&self, url: Url, completion: F) -> LoadTask
    where
        F: FnOnce(Result<Bytes, LoadError>) + Send + 'static,
    {
        let images = self.image_data_loader();
        LoadTask::spawn(
            async move { images.load_image_data(&url).await },
            completion,
        )
    }

    pub fn feed_publisher(&self) -> BoxStream<'static, Result<Vec<FeedImage>, LoadError>> {
        let feed = self.feed_loader();
        publisher(async move { feed.load().await })
    }
}

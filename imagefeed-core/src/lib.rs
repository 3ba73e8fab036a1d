pub mod caching;
pub mod clock;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod fallback;
pub mod feed;
pub mod image_storage;
pub mod loader;
pub mod local;
pub mod local_image;
pub mod mapper;
pub mod pipeline;
pub mod policy;
pub mod remote;
pub mod storage;
pub mod store;
pub mod task;

pub use caching::{CachingImageDataLoader, CachingLoader};
pub use clock::{fixed_clock, system_clock, Clock};
pub use config::{AppConfig, CacheConfig, RemoteConfig};
pub use endpoint::{FeedEndpoint, ImageCommentsEndpoint};
pub use error::{HttpClientError, LoadError, MapperError, StoreError};
pub use fallback::FallbackLoader;
pub use feed::{CachedFeed, FeedImage, ImageComment, LocalFeedImage};
pub use image_storage::{FileImageDataStore, InMemoryImageDataStore};
pub use loader::{ImageDataCache, ImageDataLoader, ResourceCache, ResourceLoader};
pub use local::LocalFeedLoader;
pub use local_image::LocalImageDataLoader;
pub use pipeline::FeedPipeline;
pub use policy::CachePolicy;
pub use remote::{
    HttpClient, RemoteCommentsLoader, RemoteFeedLoader, RemoteImageDataLoader, RemoteLoader,
    ReqwestHttpClient,
};
pub use storage::{InMemoryFeedStore, JsonFeedStore};
pub use store::{FeedImageDataStore, FeedStore};
pub use task::{publisher, LoadTask, MainQueue, MainQueueHandle};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::{HttpClientError, LoadError, MapperError};
use crate::feed::{FeedImage, ImageComment};
use crate::loader::{ImageDataLoader, ResourceLoader};
use crate::mapper::{map_comments, map_feed, map_image_data};

/// The single transport operation the loaders need.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &Url) -> Result<(Bytes, StatusCode), HttpClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self, HttpClientError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &Url) -> Result<(Bytes, StatusCode), HttpClientError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(%url, %status, len = bytes.len(), "http response");
        Ok((bytes, status))
    }
}

pub type Mapper<R> = fn(&[u8], StatusCode) -> Result<R, MapperError>;

/// Fetches one URL and decodes the body with a mapper.
pub struct RemoteLoader<R> {
    client: Arc<dyn HttpClient>,
    url: Url,
    mapper: Mapper<R>,
}

pub type RemoteFeedLoader = RemoteLoader<Vec<FeedImage>>;
pub type RemoteCommentsLoader = RemoteLoader<Vec<ImageComment>>;

impl<R> RemoteLoader<R> {
    pub fn new(client: Arc<dyn HttpClient>, url: Url, mapper: Mapper<R>) -> Self {
        Self {
            client,
            url,
            mapper,
        }
    }
}

impl RemoteLoader<Vec<FeedImage>> {
    pub fn feed(client: Arc<dyn HttpClient>, url: Url) -> Self {
        Self::new(client, url, map_feed)
    }
}

impl RemoteLoader<Vec<ImageComment>> {
    pub fn comments(client: Arc<dyn HttpClient>, url: Url) -> Self {
        Self::new(client, url, map_comments)
    }
}

#[async_trait]
impl<R: Send + 'static> ResourceLoader for RemoteLoader<R> {
    type Resource = R;

    async fn load(&self) -> Result<R, LoadError> {
        let (data, status) = self.client.get(&self.url).await?;
        Ok((self.mapper)(&data, status)?)
    }
}

pub struct RemoteImageDataLoader {
    client: Arc<dyn HttpClient>,
}

impl RemoteImageDataLoader {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageDataLoader for RemoteImageDataLoader {
    async fn load_image_data(&self, url: &Url) -> Result<Bytes, LoadError> {
        let (data, status) = self.client.get(url).await?;
        Ok(map_image_data(data, status)?)
    }
}

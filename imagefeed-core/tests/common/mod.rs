#![allow(dead_code)]

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Days, Local, Utc};
use imagefeed_core::{
    CachedFeed, FeedImage, FeedStore, HttpClientError, ImageDataCache, ImageDataLoader,
    LoadError, LocalFeedImage, ResourceCache, ResourceLoader, StoreError,
};
use tokio::sync::mpsc;
use url::Url;
use uuid::Uuid;

pub fn unique_image() -> FeedImage {
    FeedImage {
        id: Uuid::new_v4(),
        description: Some("a description".into()),
        location: Some("a location".into()),
        url: any_url(),
    }
}

pub fn any_url() -> Url {
    Url::parse(&format!("https://images.example.com/{}", Uuid::new_v4())).unwrap()
}

pub fn local(feed: &[FeedImage]) -> Vec<LocalFeedImage> {
    feed.iter().map(LocalFeedImage::from).collect()
}

pub fn connectivity_error() -> LoadError {
    LoadError::Connectivity(HttpClientError::Io(io::Error::new(
        io::ErrorKind::Other,
        "offline",
    )))
}

pub fn invalid_data_error() -> LoadError {
    LoadError::InvalidData
}

pub fn store_error() -> StoreError {
    StoreError::Io(io::Error::new(io::ErrorKind::Other, "disk failure"))
}

/// `now` minus the cache window, counted in local calendar days.
pub fn minus_days(now: DateTime<Utc>, days: u64) -> DateTime<Utc> {
    now.with_timezone(&Local)
        .checked_sub_days(Days::new(days))
        .unwrap()
        .with_timezone(&Utc)
}

pub fn temp_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("imagefeed_{label}_{}", Uuid::new_v4()));
    dir
}

/// Loader returning a fixed outcome and counting calls.
pub struct StubFeedLoader {
    outcome: Result<Vec<FeedImage>, fn() -> LoadError>,
    calls: AtomicUsize,
}

impl StubFeedLoader {
    pub fn success(feed: Vec<FeedImage>) -> Self {
        Self {
            outcome: Ok(feed),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failure(error: fn() -> LoadError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceLoader for StubFeedLoader {
    type Resource = Vec<FeedImage>;

    async fn load(&self) -> Result<Vec<FeedImage>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(feed) => Ok(feed.clone()),
            Err(error) => Err(error()),
        }
    }
}

pub struct StubImageDataLoader {
    outcome: Result<Bytes, fn() -> LoadError>,
    urls: Mutex<Vec<Url>>,
}

impl StubImageDataLoader {
    pub fn success(data: &'static [u8]) -> Self {
        Self {
            outcome: Ok(Bytes::from_static(data)),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failure(error: fn() -> LoadError) -> Self {
        Self {
            outcome: Err(error),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_urls(&self) -> Vec<Url> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageDataLoader for StubImageDataLoader {
    async fn load_image_data(&self, url: &Url) -> Result<Bytes, LoadError> {
        self.urls.lock().unwrap().push(url.clone());
        match &self.outcome {
            Ok(data) => Ok(data.clone()),
            Err(error) => Err(error()),
        }
    }
}

/// Cache sink that reports every save on a channel.
pub struct SpyFeedCache {
    fails: bool,
    saves: mpsc::UnboundedSender<Vec<FeedImage>>,
}

impl SpyFeedCache {
    pub fn new(fails: bool) -> (Self, mpsc::UnboundedReceiver<Vec<FeedImage>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { fails, saves: tx }, rx)
    }
}

#[async_trait]
impl ResourceCache<Vec<FeedImage>> for SpyFeedCache {
    async fn save(&self, feed: Vec<FeedImage>) -> Result<(), StoreError> {
        let _ = self.saves.send(feed);
        if self.fails {
            Err(store_error())
        } else {
            Ok(())
        }
    }
}

pub struct SpyImageDataCache {
    fails: bool,
    saves: mpsc::UnboundedSender<(Bytes, Url)>,
}

impl SpyImageDataCache {
    pub fn new(fails: bool) -> (Self, mpsc::UnboundedReceiver<(Bytes, Url)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { fails, saves: tx }, rx)
    }
}

#[async_trait]
impl ImageDataCache for SpyImageDataCache {
    async fn save(&self, data: Bytes, url: &Url) -> Result<(), StoreError> {
        let _ = self.saves.send((data, url.clone()));
        if self.fails {
            Err(store_error())
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreMessage {
    Delete,
    Insert(Vec<LocalFeedImage>, DateTime<Utc>),
    Retrieve,
}

#[derive(Clone)]
pub enum Retrieval {
    Empty,
    Found(CachedFeed),
    Failure,
}

/// Feed store that records every call and answers from configured outcomes.
pub struct FeedStoreSpy {
    messages: Mutex<Vec<StoreMessage>>,
    retrieval: Mutex<Retrieval>,
    delete_fails: bool,
    insert_fails: bool,
}

impl FeedStoreSpy {
    pub fn new(retrieval: Retrieval) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            retrieval: Mutex::new(retrieval),
            delete_fails: false,
            insert_fails: false,
        }
    }

    pub fn failing_delete(mut self) -> Self {
        self.delete_fails = true;
        self
    }

    pub fn failing_insert(mut self) -> Self {
        self.insert_fails = true;
        self
    }

    pub fn messages(&self) -> Vec<StoreMessage> {
        self.messages.lock().unwrap().clone()
    }

    fn record(&self, message: StoreMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

#[async_trait]
impl FeedStore for FeedStoreSpy {
    async fn delete_cached_feed(&self) -> Result<(), StoreError> {
        self.record(StoreMessage::Delete);
        if self.delete_fails {
            Err(store_error())
        } else {
            Ok(())
        }
    }

    async fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.record(StoreMessage::Insert(feed, timestamp));
        if self.insert_fails {
            Err(store_error())
        } else {
            Ok(())
        }
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, StoreError> {
        self.record(StoreMessage::Retrieve);
        match self.retrieval.lock().unwrap().clone() {
            Retrieval::Empty => Ok(None),
            Retrieval::Found(cache) => Ok(Some(cache)),
            Retrieval::Failure => Err(store_error()),
        }
    }
}

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use imagefeed_core::{
    fixed_clock, CachePolicy, CachedFeed, FeedStore, InMemoryFeedStore, LoadError,
    LocalFeedImage, LocalFeedLoader, StoreError,
};

use common::{local, minus_days, unique_image, FeedStoreSpy, Retrieval, StoreMessage};

const MAX_AGE: u64 = 7;

fn make_loader(store: Arc<FeedStoreSpy>, now: chrono::DateTime<Utc>) -> LocalFeedLoader {
    LocalFeedLoader::new(store, fixed_clock(now), CachePolicy::new(MAX_AGE))
}

#[tokio::test]
async fn load_from_empty_store_delivers_empty_feed() {
    let store = Arc::new(FeedStoreSpy::new(Retrieval::Empty));
    let loader = make_loader(store.clone(), Utc::now());

    let feed = loader.load().await.unwrap();

    assert!(feed.is_empty());
    assert_eq!(store.messages(), vec![StoreMessage::Retrieve]);
}

#[tokio::test]
async fn load_delivers_cached_feed_younger_than_max_age() {
    let now = Utc::now();
    let feed = vec![unique_image(), unique_image()];
    let store = Arc::new(FeedStoreSpy::new(Retrieval::Found(CachedFeed {
        feed: local(&feed),
        timestamp: minus_days(now, 1),
    })));
    let loader = make_loader(store, now);

    assert_eq!(loader.load().await.unwrap(), feed);
}

#[tokio::test]
async fn load_delivers_empty_feed_once_cache_expired() {
    let now = Utc::now();
    let feed = vec![unique_image(), unique_image()];
    for timestamp in [
        minus_days(now, MAX_AGE),
        minus_days(now, MAX_AGE + 1),
    ] {
        let store = Arc::new(FeedStoreSpy::new(Retrieval::Found(CachedFeed {
            feed: local(&feed),
            timestamp,
        })));
        let loader = make_loader(store.clone(), now);

        assert!(loader.load().await.unwrap().is_empty());
        assert_eq!(store.messages(), vec![StoreMessage::Retrieve]);
    }
}

#[tokio::test]
async fn load_just_inside_max_age_still_delivers_feed() {
    let now = Utc::now();
    let feed = vec![unique_image()];
    let store = Arc::new(FeedStoreSpy::new(Retrieval::Found(CachedFeed {
        feed: local(&feed),
        timestamp: minus_days(now, MAX_AGE) + Duration::seconds(1),
    })));

    assert_eq!(make_loader(store, now).load().await.unwrap(), feed);
}

#[tokio::test]
async fn load_surfaces_retrieval_error_without_side_effects() {
    let store = Arc::new(FeedStoreSpy::new(Retrieval::Failure));
    let loader = make_loader(store.clone(), Utc::now());

    let result = loader.load().await;

    assert!(matches!(result, Err(LoadError::Store(_))));
    assert_eq!(store.messages(), vec![StoreMessage::Retrieve]);
}

#[tokio::test]
async fn save_deletes_then_inserts_with_current_timestamp() {
    let now = Utc::now();
    let feed = vec![unique_image(), unique_image()];
    let store = Arc::new(FeedStoreSpy::new(Retrieval::Empty));
    let loader = make_loader(store.clone(), now);

    loader.save(&feed).await.unwrap();

    assert_eq!(
        store.messages(),
        vec![StoreMessage::Delete, StoreMessage::Insert(local(&feed), now)]
    );
}

#[tokio::test]
async fn save_does_not_insert_when_deletion_fails() {
    let store = Arc::new(FeedStoreSpy::new(Retrieval::Empty).failing_delete());
    let loader = make_loader(store.clone(), Utc::now());

    let result = loader.save(&[unique_image()]).await;

    assert!(result.is_err());
    assert_eq!(store.messages(), vec![StoreMessage::Delete]);
}

#[tokio::test]
async fn save_surfaces_insertion_error() {
    let store = Arc::new(FeedStoreSpy::new(Retrieval::Empty).failing_insert());
    let loader = make_loader(store.clone(), Utc::now());

    assert!(loader.save(&[unique_image()]).await.is_err());
    assert_eq!(store.messages().len(), 2);
}

#[tokio::test]
async fn validate_deletes_unreadable_cache() {
    let store = Arc::new(FeedStoreSpy::new(Retrieval::Failure));
    let loader = make_loader(store.clone(), Utc::now());

    loader.validate_cache().await.unwrap();

    assert_eq!(
        store.messages(),
        vec![StoreMessage::Retrieve, StoreMessage::Delete]
    );
}

#[tokio::test]
async fn validate_deletes_expired_cache() {
    let now = Utc::now();
    let store = Arc::new(FeedStoreSpy::new(Retrieval::Found(CachedFeed {
        feed: local(&[unique_image()]),
        timestamp: minus_days(now, MAX_AGE),
    })));
    let loader = make_loader(store.clone(), now);

    loader.validate_cache().await.unwrap();

    assert_eq!(
        store.messages(),
        vec![StoreMessage::Retrieve, StoreMessage::Delete]
    );
}

#[tokio::test]
async fn validate_leaves_empty_or_fresh_cache_alone() {
    let now = Utc::now();
    let fresh = Retrieval::Found(CachedFeed {
        feed: local(&[unique_image()]),
        timestamp: minus_days(now, MAX_AGE) + Duration::seconds(1),
    });
    for retrieval in [Retrieval::Empty, fresh] {
        let store = Arc::new(FeedStoreSpy::new(retrieval));
        let loader = make_loader(store.clone(), now);

        loader.validate_cache().await.unwrap();

        assert_eq!(store.messages(), vec![StoreMessage::Retrieve]);
    }
}

#[tokio::test]
async fn validate_reports_failed_deletion() {
    let store = Arc::new(FeedStoreSpy::new(Retrieval::Failure).failing_delete());
    let loader = make_loader(store, Utc::now());

    assert!(loader.validate_cache().await.is_err());
}

#[tokio::test]
async fn second_save_supersedes_first_snapshot() {
    let store = Arc::new(InMemoryFeedStore::new());
    let first_now = Utc::now() - Duration::hours(1);
    let second_now = Utc::now();
    let feed_a = vec![unique_image(), unique_image()];
    let feed_b = vec![unique_image()];

    LocalFeedLoader::new(store.clone(), fixed_clock(first_now), CachePolicy::default())
        .save(&feed_a)
        .await
        .unwrap();
    let second = LocalFeedLoader::new(store.clone(), fixed_clock(second_now), CachePolicy::default());
    second.save(&feed_b).await.unwrap();

    assert_eq!(
        imagefeed_core::FeedStore::retrieve(store.as_ref()).await.unwrap(),
        Some(CachedFeed {
            feed: local(&feed_b),
            timestamp: second_now,
        })
    );
    assert_eq!(second.load().await.unwrap(), feed_b);
}

/// In-memory store whose inserts take a while to land.
struct SlowInsertStore {
    inner: InMemoryFeedStore,
    delay: std::time::Duration,
}

#[async_trait]
impl FeedStore for SlowInsertStore {
    async fn delete_cached_feed(&self) -> Result<(), StoreError> {
        self.inner.delete_cached_feed().await
    }

    async fn insert(
        &self,
        feed: Vec<LocalFeedImage>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.insert(feed, timestamp).await
    }

    async fn retrieve(&self) -> Result<Option<CachedFeed>, StoreError> {
        self.inner.retrieve().await
    }
}

#[tokio::test]
async fn load_during_save_sees_a_whole_snapshot() {
    let store = Arc::new(SlowInsertStore {
        inner: InMemoryFeedStore::new(),
        delay: std::time::Duration::from_millis(100),
    });
    let loader = Arc::new(make_loader_on(store, Utc::now()));
    let feed_a = vec![unique_image(), unique_image()];
    let feed_b = vec![unique_image()];
    loader.save(&feed_a).await.unwrap();

    let saving = {
        let loader = Arc::clone(&loader);
        let feed_b = feed_b.clone();
        tokio::spawn(async move { loader.save(&feed_b).await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(30)).await;
    let loaded = loader.load().await.unwrap();

    assert_eq!(loaded, feed_b);
    saving.await.unwrap().unwrap();
}

fn make_loader_on(store: Arc<dyn FeedStore>, now: DateTime<Utc>) -> LocalFeedLoader {
    LocalFeedLoader::new(store, fixed_clock(now), CachePolicy::new(MAX_AGE))
}

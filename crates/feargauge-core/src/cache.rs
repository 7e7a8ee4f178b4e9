//! In-memory TTL cache for raw feed payloads.
//!
//! [`CachedFeed`] wraps any [`SentimentFeed`] and serves a payload from
//! [`CacheStore`] while it is fresh. Only successful payloads are stored;
//! errors always pass through. Snapshots are never cached, so every
//! aggregation still validates and derives from scratch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::feed::{FeedFuture, RawPayload, SentimentFeed};
use crate::FeedId;

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: RawPayload,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now <= expires_at)
    }
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl CacheInner {
    fn get(&self, key: &str) -> Option<RawPayload> {
        let now = Instant::now();
        self.map
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.payload.clone())
    }

    fn put(&mut self, key: String, payload: RawPayload) {
        let expires_at = Instant::now().checked_add(self.ttl);
        self.map.insert(key, CacheEntry { payload, expires_at });
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.is_fresh(now));
    }
}

/// Thread-safe payload cache shared by the decorated feeds.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl CacheStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                ttl,
            })),
        }
    }

    /// A store with a zero TTL never retains anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn get(&self, key: &str) -> Option<RawPayload> {
        self.inner.read().await.get(key)
    }

    pub async fn put(&self, key: String, payload: RawPayload) {
        let mut store = self.inner.write().await;
        if store.ttl.is_zero() {
            return;
        }
        store.put(key, payload);
    }

    pub async fn clear_expired(&self) {
        self.inner.write().await.clear_expired();
    }

    pub async fn clear(&self) {
        self.inner.write().await.map.clear();
    }

    /// Number of entries, including expired ones not yet cleared.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Cache decorator preserving the [`SentimentFeed`] contract.
pub struct CachedFeed {
    inner: Arc<dyn SentimentFeed>,
    store: CacheStore,
}

impl CachedFeed {
    pub fn new(inner: Arc<dyn SentimentFeed>, store: CacheStore) -> Self {
        Self { inner, store }
    }
}

impl SentimentFeed for CachedFeed {
    fn id(&self) -> FeedId {
        self.inner.id()
    }

    fn cache_key(&self) -> String {
        self.inner.cache_key()
    }

    fn fetch<'a>(&'a self) -> FeedFuture<'a> {
        Box::pin(async move {
            let key = self.inner.cache_key();
            if let Some(payload) = self.store.get(&key).await {
                debug!(feed = %self.id(), "serving feed payload from cache");
                return Ok(payload);
            }

            let payload = self.inner.fetch().await?;
            self.store.put(key, payload.clone()).await;
            Ok(payload)
        })
    }
}

//! Time-bounded cache for per-symbol insight summaries
//!
//! Avoids redundant remote calls for the handful of human-driven symbols the
//! pipeline sees. One entry per key, last-write-wins, no eviction beyond TTL
//! expiry. Concurrent misses for the same key are not deduplicated: each
//! proceeds independently, which is acceptable at this contention profile.

use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Thread-safe TTL cache keyed by subject (e.g. a stock symbol)
pub struct InsightsCache<T> {
    cache: Arc<RwLock<TimedCache<String, T>>>,
}

impl<T: Clone> InsightsCache<T> {
    /// Create a new cache with the specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a value from the cache if present and not expired
    pub async fn get(&self, key: &str) -> Option<T> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value, overwriting any prior entry for the key
    pub async fn insert(&self, key: impl Into<String>, value: T) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key.into(), value);
    }

    /// Get or fetch a value using the provided fetcher function
    ///
    /// A valid cached entry is returned immediately. Otherwise the fetcher
    /// runs, its result is stored under the key, and the fresh value is
    /// returned. A fetcher error is surfaced to the caller and nothing is
    /// cached, so a recovered source repopulates on the next call.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetcher: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(key).await {
            tracing::debug!("Cache hit for key: {}", key);
            return Ok(value);
        }

        tracing::debug!("Cache miss for key: {}", key);

        let value = fetcher().await?;
        self.insert(key.to_string(), value.clone()).await;

        Ok(value)
    }

    /// Invalidate a specific cache entry
    pub async fn invalidate(&self, key: &str) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_remove(key);
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<T> Clone for InsightsCache<T> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

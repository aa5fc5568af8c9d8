use crate::prefill_entries;
use async_trait::async_trait;
use bench_core::ports::CachePort;
use bench_core::{CacheKey, Lookup};
use moka::future::Cache;
use shared::Result;
use std::fmt::Debug;
use std::time::Duration;

/// Moka-based cache adapter with TTL support.
/// Provides a lock-free, concurrent cache with optional size bounds and TTL.
pub struct MokaCache {
    cache: Cache<String, String>,
}

impl MokaCache {
    /// Create a new bounded Moka cache with max entries and optional default TTL
    pub fn new_bounded(max_entries: u64, default_ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(max_entries);

        if let Some(ttl) = default_ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
        }
    }

    /// Bounded to `size` and pre-populated with the benchmark key space.
    pub async fn prefilled(size: usize, default_ttl: Option<Duration>) -> Self {
        let store = Self::new_bounded(size as u64, default_ttl);
        for (key, value) in prefill_entries(size) {
            store.cache.insert(key, value).await;
        }
        store.cache.run_pending_tasks().await;
        store
    }

    pub async fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.cache.insert(key.into(), value.into()).await;
    }
}

#[async_trait]
impl CachePort for MokaCache {
    fn name(&self) -> &'static str {
        "moka"
    }

    async fn get(&self, key: &CacheKey) -> Result<Lookup> {
        // Expired entries read as a miss.
        Ok(self.cache.get(key.as_str()).await.into())
    }
}

impl Debug for MokaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCache")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}

use crate::prefill_entries;
use async_trait::async_trait;
use bench_core::ports::CachePort;
use bench_core::{CacheKey, Lookup};
use foyer::{Cache, CacheBuilder};
use shared::Result;
use std::fmt::Debug;

/// Above this many entries the cache is split into `SHARDS` shards.
const SINGLE_SHARD_LIMIT: usize = 65_536;
const SHARDS: usize = 16;

/// Foyer-based in-memory cache adapter
pub struct FoyerCache {
    cache: Cache<String, String>,
    capacity: usize,
}

impl FoyerCache {
    /// Capacity is counted in entries. Sharded caches get headroom so an
    /// uneven key spread does not evict prefilled entries.
    pub fn new(name: &str, entries: usize) -> Self {
        let (shards, capacity) = if entries <= SINGLE_SHARD_LIMIT {
            (1, entries.max(1))
        } else {
            (SHARDS, entries * 2)
        };

        let cache = CacheBuilder::new(capacity)
            .with_name(name.to_string())
            .with_shards(shards)
            .build();

        Self { cache, capacity }
    }

    pub fn prefilled(size: usize) -> Self {
        let store = Self::new("bench-foyer", size);
        for (key, value) in prefill_entries(size) {
            store.cache.insert(key, value);
        }
        store
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.cache.insert(key.into(), value.into());
    }
}

#[async_trait]
impl CachePort for FoyerCache {
    fn name(&self) -> &'static str {
        "foyer"
    }

    async fn get(&self, key: &CacheKey) -> Result<Lookup> {
        Ok(match self.cache.get(key.as_str()) {
            Some(entry) => Lookup::Hit(entry.value().clone()),
            None => Lookup::Miss,
        })
    }
}

impl Debug for FoyerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoyerCache")
            .field("cache", &"<foyer::Cache>")
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_foyer_cache_put_and_get() {
        let cache = FoyerCache::new("test", 16);
        cache.insert("hello", "world");

        let key = CacheKey::parse("hello").unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Lookup::Hit("world".into()));
    }

    #[tokio::test]
    async fn test_foyer_cache_get_nonexistent() {
        let cache = FoyerCache::new("test", 16);

        let key = CacheKey::parse("nonexistent").unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Lookup::Miss);
    }

    #[tokio::test]
    async fn test_foyer_cache_overwrite() {
        let cache = FoyerCache::new("test", 16);
        cache.insert("key", "value1");
        cache.insert("key", "value2");

        let key = CacheKey::parse("key").unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Lookup::Hit("value2".into()));
    }

    #[tokio::test]
    async fn test_foyer_cache_prefilled_keeps_every_entry() {
        let cache = FoyerCache::prefilled(1_000);
        for i in [1, 500, 1_000] {
            let key = CacheKey::parse(&i.to_string()).unwrap();
            assert_eq!(
                cache.get(&key).await.unwrap(),
                Lookup::Hit(format!("value-{}", i))
            );
        }
    }
}

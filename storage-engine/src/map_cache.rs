use crate::prefill_entries;
use async_trait::async_trait;
use bench_core::ports::CachePort;
use bench_core::{CacheKey, Lookup};
use dashmap::DashMap;
use shared::Result;
use std::fmt::Debug;

/// Baseline adapter over a sharded concurrent map. No eviction, no TTL.
pub struct MapCache {
    map: DashMap<String, String>,
}

impl MapCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: DashMap::with_capacity(capacity),
        }
    }

    pub fn prefilled(size: usize) -> Self {
        let cache = Self::with_capacity(size);
        for (key, value) in prefill_entries(size) {
            cache.map.insert(key, value);
        }
        cache
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }
}

#[async_trait]
impl CachePort for MapCache {
    fn name(&self) -> &'static str {
        "map"
    }

    async fn get(&self, key: &CacheKey) -> Result<Lookup> {
        Ok(self.map.get(key.as_str()).map(|v| v.value().clone()).into())
    }
}

impl Debug for MapCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapCache")
            .field("entries", &self.map.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_map_cache_round_trip() {
        let cache = MapCache::with_capacity(4);
        cache.insert("answer", "42");

        let key = CacheKey::parse("answer").unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Lookup::Hit("42".into()));
    }

    #[tokio::test]
    async fn test_map_cache_never_inserted_is_miss() {
        let cache = MapCache::prefilled(5);
        assert_eq!(cache.map.len(), 5);

        let key = CacheKey::parse("nonexistent").unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Lookup::Miss);
    }

    #[tokio::test]
    async fn test_map_cache_empty_value_is_hit() {
        let cache = MapCache::with_capacity(1);
        cache.insert("blank", "");

        let key = CacheKey::parse("blank").unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Lookup::Hit(String::new()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_map_cache_parallel_distinct_keys() {
        let cache = Arc::new(MapCache::with_capacity(20));
        for i in 0..20 {
            cache.insert(format!("k{}", i), format!("v{}", i));
        }

        let calls = (0..100).map(|n| {
            let cache = cache.clone();
            tokio::spawn(async move {
                let i = n % 20;
                let key = CacheKey::parse(&format!("k{}", i)).unwrap();
                (i, cache.get(&key).await.unwrap())
            })
        });

        for joined in join_all(calls).await {
            let (i, lookup) = joined.unwrap();
            assert_eq!(lookup, Lookup::Hit(format!("v{}", i)));
        }
    }
}

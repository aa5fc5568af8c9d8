pub mod foyer_cache;
pub mod map_cache;
pub mod moka_cache;
pub mod request_counters;

use async_trait::async_trait;
use bench_core::ports::{CachePort, StorageFactory};
use bench_core::CacheConfig;
use shared::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub use foyer_cache::FoyerCache;
pub use map_cache::MapCache;
pub use moka_cache::MokaCache;
pub use request_counters::RequestCounters;

/// Entries written during prefill live this long on TTL-aware backends.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub const CACHE_IMPLS: &[&str] = &["map", "moka", "foyer"];

/// Keys `"size"` down to `"1"` mapped to `"value-<n>"`.
pub fn prefill_entries(size: usize) -> impl Iterator<Item = (String, String)> {
    (1..=size).rev().map(|i| (i.to_string(), format!("value-{}", i)))
}

/// Selects a cache adapter by name and pre-populates it.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnifiedStorageFactory;

#[async_trait]
impl StorageFactory for UnifiedStorageFactory {
    fn available(&self) -> &'static [&'static str] {
        CACHE_IMPLS
    }

    async fn create_from_config(&self, config: &CacheConfig) -> Result<Arc<dyn CachePort>> {
        info!("CACHE_IMPL: {}, CACHE_SIZE: {}", config.kind, config.size);

        let store: Arc<dyn CachePort> = match config.kind.as_str() {
            "" | "map" => Arc::new(MapCache::prefilled(config.size)),
            "moka" => Arc::new(MokaCache::prefilled(config.size, Some(DEFAULT_TTL)).await),
            "foyer" => Arc::new(FoyerCache::prefilled(config.size)),
            other => {
                return Err(Error::Binding {
                    port: "CachePort",
                    reason: format!(
                        "unknown CACHE_IMPL '{}' (supported: {})",
                        other,
                        CACHE_IMPLS.join(",")
                    ),
                });
            }
        };

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bench_core::{CacheKey, Lookup, PortBindings};
    use futures::future::join_all;

    #[test]
    fn test_prefill_is_descending() {
        let entries: Vec<_> = prefill_entries(3).collect();
        assert_eq!(
            entries,
            vec![
                ("3".to_string(), "value-3".to_string()),
                ("2".to_string(), "value-2".to_string()),
                ("1".to_string(), "value-1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_every_impl_serves_prefilled_values() {
        let factory = UnifiedStorageFactory;
        for kind in factory.available() {
            let store = factory
                .create_from_config(&CacheConfig::new(*kind, 20))
                .await
                .unwrap();
            let key = CacheKey::parse("7").unwrap();
            assert_eq!(
                store.get(&key).await.unwrap(),
                Lookup::Hit("value-7".to_string()),
                "impl {}",
                kind
            );
            let key = CacheKey::parse("21").unwrap();
            assert_eq!(store.get(&key).await.unwrap(), Lookup::Miss, "impl {}", kind);
        }
    }

    struct NoSleep;

    #[async_trait]
    impl bench_core::SleepPort for NoSleep {
        fn name(&self) -> &'static str {
            "none"
        }

        async fn sleep(
            &self,
            _request: bench_core::DurationRequest,
            _interrupt: &bench_core::Interrupt,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_distinct_keys_through_bindings() {
        let factory = UnifiedStorageFactory;
        for kind in factory.available() {
            let cache = factory
                .create_from_config(&CacheConfig::new(*kind, 20))
                .await
                .unwrap();
            let bindings = PortBindings::builder()
                .sleep(Arc::new(NoSleep))
                .cache(cache)
                .metrics(Arc::new(RequestCounters::new()))
                .bind()
                .unwrap();

            let calls = (0..100).map(|n| {
                let bindings = bindings.clone();
                tokio::spawn(async move {
                    let i = n % 20 + 1;
                    (i, bindings.get(&i.to_string()).await.unwrap())
                })
            });

            for joined in join_all(calls).await {
                let (i, lookup) = joined.unwrap();
                assert_eq!(lookup, Lookup::Hit(format!("value-{}", i)), "impl {}", kind);
            }
            assert_eq!(bindings.in_flight(), 0);
        }
    }

    #[tokio::test]
    async fn test_unknown_impl_fails_binding() {
        let err = UnifiedStorageFactory
            .create_from_config(&CacheConfig::new("ristretto", 10))
            .await
            .err()
            .unwrap();
        match err {
            Error::Binding { port, reason } => {
                assert_eq!(port, "CachePort");
                assert!(reason.contains("ristretto"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}

use crate::domain::{CacheConfig, CacheKey, DurationRequest, Lookup, TimeUnit};
use crate::interrupt::Interrupt;
use async_trait::async_trait;
use shared::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

// Ports are the capability contracts benchmark logic depends on.
// Adapters in storage-engine and time-engine implement them per host runtime.

/// Suspends the calling execution unit for a validated duration.
#[async_trait]
pub trait SleepPort: Send + Sync + 'static {
    /// Stable adapter name used in logs and binding diagnostics.
    fn name(&self) -> &'static str;

    /// Returns `Ok` no earlier than `request.duration()` after the call,
    /// or `Error::Interrupted` if `interrupt` fires first. Never retries.
    async fn sleep(&self, request: DurationRequest, interrupt: &Interrupt) -> Result<()>;
}

/// Read path over a cache backing store.
#[async_trait]
pub trait CachePort: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// `Lookup::Miss` when the key holds nothing; store failures are
    /// `Error::Unavailable`, never a miss.
    async fn get(&self, key: &CacheKey) -> Result<Lookup>;
}

/// Per-endpoint request accounting. Increments never fail and never block.
pub trait MetricsPort: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn increment_hello_request(&self, endpoint_tag: &'static str);

    /// Totals recorded so far, ordered by endpoint tag.
    fn hello_requests(&self) -> Vec<(&'static str, u64)>;
}

#[async_trait]
pub trait SleepPortExt: SleepPort {
    /// Validates raw caller input, then delegates. Invalid input never reaches the adapter.
    async fn sleep_for(
        &self,
        amount: i64,
        unit: Option<TimeUnit>,
        interrupt: &Interrupt,
    ) -> Result<()> {
        let request = DurationRequest::new(amount, unit)?;
        self.sleep(request, interrupt).await
    }
}

impl<T: SleepPort + ?Sized> SleepPortExt for T {}

#[async_trait]
pub trait CachePortExt: CachePort {
    /// Races the lookup against `deadline` instead of waiting on a stuck store.
    async fn get_within(&self, key: &CacheKey, deadline: Duration) -> Result<Lookup> {
        tokio::time::timeout(deadline, self.get(key))
            .await
            .map_err(|_| Error::Timeout(deadline))?
    }
}

impl<T: CachePort + ?Sized> CachePortExt for T {}

/// Port for creating cache adapters from configuration.
/// This allows different storage backends to be plugged in.
#[async_trait]
pub trait StorageFactory: Send + Sync + 'static {
    fn available(&self) -> &'static [&'static str];

    /// Unknown kinds fail with `Error::Binding` for `CachePort`.
    async fn create_from_config(&self, config: &CacheConfig) -> Result<Arc<dyn CachePort>>;
}

/// Port for creating sleep adapters by name.
pub trait SleepFactory: Send + Sync + 'static {
    fn available(&self) -> &'static [&'static str];

    /// Unknown kinds fail with `Error::Binding` for `SleepPort`.
    fn create(&self, kind: &str) -> Result<Arc<dyn SleepPort>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSleep {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SleepPort for CountingSleep {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn sleep(&self, _request: DurationRequest, _interrupt: &Interrupt) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct StuckCache;

    #[async_trait]
    impl CachePort for StuckCache {
        fn name(&self) -> &'static str {
            "stuck"
        }

        async fn get(&self, _key: &CacheKey) -> Result<Lookup> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_adapter() {
        let port = CountingSleep {
            calls: AtomicUsize::new(0),
        };
        let interrupt = Interrupt::new();

        let result = port.sleep_for(5, None, &interrupt).await;
        assert!(matches!(result, Err(Error::Precondition(_))));
        let result = port.sleep_for(-1, Some(TimeUnit::Seconds), &interrupt).await;
        assert!(matches!(result, Err(Error::Precondition(_))));
        assert_eq!(port.calls.load(Ordering::SeqCst), 0);

        port.sleep_for(0, Some(TimeUnit::Seconds), &interrupt)
            .await
            .unwrap();
        assert_eq!(port.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_within_times_out() {
        let port: Arc<dyn CachePort> = Arc::new(StuckCache);
        let key = CacheKey::parse("1").unwrap();
        let deadline = Duration::from_millis(20);

        let result = port.get_within(&key, deadline).await;
        match result {
            Err(Error::Timeout(d)) => assert_eq!(d, deadline),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}

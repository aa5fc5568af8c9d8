use crate::domain::{HelloMode, Lookup, TimeUnit};
use crate::interrupt::Interrupt;
use crate::planes::control::PortBindings;
use crate::planes::data::operation::HelloOperations;
use async_trait::async_trait;
use shared::{Error, Result};

/// Hot-path cache key used by all hello endpoints.
pub const CACHE_KEY: &str = "1";

/// Application/use-case layer. Keeps host adapters thin and benchmark logic centralized.
#[derive(Clone, Debug)]
pub struct HelloService {
    bindings: PortBindings,
}

impl HelloService {
    pub fn new(bindings: PortBindings) -> Self {
        Self { bindings }
    }
}

#[async_trait]
impl HelloOperations for HelloService {
    async fn hello(
        &self,
        mode: HelloMode,
        sleep_seconds: i64,
        interrupt: &Interrupt,
    ) -> Result<String> {
        if sleep_seconds < 0 {
            return Err(Error::precondition(format!(
                "sleep must be >= 0 (got {})",
                sleep_seconds
            )));
        }

        self.bindings.record_hello(mode.endpoint_tag())?;

        if sleep_seconds > 0 {
            self.bindings
                .sleep(sleep_seconds, Some(TimeUnit::Seconds), interrupt)
                .await?;
        }

        match self.bindings.get(CACHE_KEY).await? {
            Lookup::Hit(value) => Ok(format!("{}{}", mode.response_prefix(), value)),
            Lookup::Miss => Err(Error::NotFound),
        }
    }

    async fn lookup(&self, key: &str) -> Result<Lookup> {
        self.bindings.get(key).await
    }

    fn interrupt(&self) -> Interrupt {
        self.bindings.interrupt()
    }

    fn hello_requests(&self) -> Vec<(&'static str, u64)> {
        self.bindings.hello_requests()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CacheKey, DurationRequest};
    use crate::ports::{CachePort, MetricsPort, SleepPort};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    /// Records requested sleeps instead of waiting.
    #[derive(Default)]
    struct RecordingSleep {
        last_secs: AtomicU64,
    }

    #[async_trait]
    impl SleepPort for RecordingSleep {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn sleep(&self, request: DurationRequest, interrupt: &Interrupt) -> Result<()> {
            if interrupt.is_triggered() {
                return Err(Error::Interrupted);
            }
            self.last_secs
                .store(request.duration().as_secs(), Ordering::SeqCst);
            Ok(())
        }
    }

    struct HotKeyCache(Option<&'static str>);

    #[async_trait]
    impl CachePort for HotKeyCache {
        fn name(&self) -> &'static str {
            "hot-key"
        }

        async fn get(&self, key: &CacheKey) -> Result<Lookup> {
            match (key.as_str(), self.0) {
                (CACHE_KEY, Some(v)) => Ok(Lookup::Hit(v.to_string())),
                _ => Ok(Lookup::Miss),
            }
        }
    }

    /// Keeps tags in call order.
    #[derive(Default)]
    struct TagLog(Mutex<Vec<&'static str>>);

    impl MetricsPort for TagLog {
        fn name(&self) -> &'static str {
            "tag-log"
        }

        fn increment_hello_request(&self, endpoint_tag: &'static str) {
            self.0.lock().unwrap().push(endpoint_tag);
        }

        fn hello_requests(&self) -> Vec<(&'static str, u64)> {
            let tags = self.0.lock().unwrap();
            HelloMode::ALL
                .iter()
                .map(|m| m.endpoint_tag())
                .map(|tag| (tag, tags.iter().filter(|t| **t == tag).count() as u64))
                .filter(|(_, n)| *n > 0)
                .collect()
        }
    }

    fn service(value: Option<&'static str>) -> (HelloService, Arc<RecordingSleep>) {
        let sleep = Arc::new(RecordingSleep::default());
        let bindings = PortBindings::builder()
            .sleep(sleep.clone())
            .cache(Arc::new(HotKeyCache(value)))
            .metrics(Arc::new(TagLog::default()))
            .bind()
            .unwrap();
        (HelloService::new(bindings), sleep)
    }

    #[tokio::test]
    async fn test_hello_returns_mode_prefix_and_value() {
        let (service, _) = service(Some("value-1"));
        let interrupt = service.interrupt();
        let body = service
            .hello(HelloMode::Virtual, 0, &interrupt)
            .await
            .unwrap();
        assert_eq!(body, "Hello from Rust virtual REST value-1");
    }

    #[tokio::test]
    async fn test_hello_sleeps_in_seconds() {
        let (service, sleep) = service(Some("value-1"));
        let interrupt = service.interrupt();
        service
            .hello(HelloMode::Platform, 3, &interrupt)
            .await
            .unwrap();
        assert_eq!(sleep.last_secs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_hello_rejects_negative_sleep() {
        let (service, sleep) = service(Some("value-1"));
        let interrupt = service.interrupt();
        let err = service
            .hello(HelloMode::Reactive, -1, &interrupt)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert_eq!(sleep.last_secs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_hot_key_miss_is_not_found() {
        let (service, _) = service(None);
        let interrupt = service.interrupt();
        let err = service
            .hello(HelloMode::Virtual, 0, &interrupt)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[tokio::test]
    async fn test_interrupted_sleep_propagates() {
        let (service, _) = service(Some("value-1"));
        let interrupt = service.interrupt();
        interrupt.trigger();
        let err = service
            .hello(HelloMode::Virtual, 1, &interrupt)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Interrupted));
    }

    #[tokio::test]
    async fn test_every_valid_hello_is_counted_per_endpoint() {
        let (missing, _) = service(None);
        let (service, _) = service(Some("value-1"));
        let interrupt = service.interrupt();
        for mode in [HelloMode::Platform, HelloMode::Reactive, HelloMode::Platform] {
            service.hello(mode, 0, &interrupt).await.unwrap();
        }
        // Rejected input is not a request.
        let _ = service.hello(HelloMode::Virtual, -1, &interrupt).await;
        // A miss still counts: the endpoint was hit.
        let _ = missing.hello(HelloMode::Virtual, 0, &interrupt).await;

        assert_eq!(
            service.hello_requests(),
            vec![("/hello/platform", 2), ("/hello/reactive", 1)]
        );
        assert_eq!(missing.hello_requests(), vec![("/hello/virtual", 1)]);
    }

    #[tokio::test]
    async fn test_lookup_passes_through() {
        let (service, _) = service(Some("value-1"));
        assert_eq!(service.lookup("1").await.unwrap(), Lookup::Hit("value-1".into()));
        assert_eq!(service.lookup("2").await.unwrap(), Lookup::Miss);
    }
}

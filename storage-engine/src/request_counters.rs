use bench_core::ports::MetricsPort;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-process per-endpoint request counters.
#[derive(Debug, Default)]
pub struct RequestCounters {
    counts: DashMap<&'static str, AtomicU64>,
}

impl RequestCounters {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetricsPort for RequestCounters {
    fn name(&self) -> &'static str {
        "counters"
    }

    fn increment_hello_request(&self, endpoint_tag: &'static str) {
        // Shard write lock only on the first increment of a tag.
        if let Some(count) = self.counts.get(endpoint_tag) {
            count.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.counts
            .entry(endpoint_tag)
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    fn hello_requests(&self) -> Vec<(&'static str, u64)> {
        let mut totals: Vec<_> = self
            .counts
            .iter()
            .map(|entry| (*entry.key(), entry.value().load(Ordering::Relaxed)))
            .collect();
        totals.sort_unstable();
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::Arc;

    #[test]
    fn test_empty_counters_report_nothing() {
        assert!(RequestCounters::new().hello_requests().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let counters = Arc::new(RequestCounters::new());
        let tags = ["/hello/platform", "/hello/virtual", "/hello/reactive"];

        let calls = (0..300).map(|n| {
            let counters = counters.clone();
            let tag = tags[n % 3];
            tokio::spawn(async move { counters.increment_hello_request(tag) })
        });
        for joined in join_all(calls).await {
            joined.unwrap();
        }

        assert_eq!(
            counters.hello_requests(),
            vec![
                ("/hello/platform", 100),
                ("/hello/reactive", 100),
                ("/hello/virtual", 100),
            ]
        );
    }
}

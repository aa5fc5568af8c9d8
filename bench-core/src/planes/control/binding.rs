use crate::domain::{CacheConfig, CacheKey, DurationRequest, Lookup, TimeUnit};
use crate::interrupt::Interrupt;
use crate::planes::control::lifecycle::{Lifecycle, LifecycleCell};
use crate::ports::{
    CachePort, CachePortExt, MetricsPort, SleepFactory, SleepPort, StorageFactory,
};
use shared::config::Config;
use shared::{Error, Result};
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, error, info, trace, warn};

const SLEEP_PORT: &str = "SleepPort";
const CACHE_PORT: &str = "CachePort";
const METRICS_PORT: &str = "MetricsPort";
const DEFAULT_CACHE_DEADLINE: Duration = Duration::from_secs(1);

/// Collects exactly one adapter per port before anything can be invoked.
pub struct PortBindingsBuilder {
    lifecycle: LifecycleCell,
    sleep: Option<Arc<dyn SleepPort>>,
    cache: Option<Arc<dyn CachePort>>,
    metrics: Option<Arc<dyn MetricsPort>>,
    cache_deadline: Duration,
    conflict: Option<Error>,
}

impl PortBindingsBuilder {
    fn new() -> Self {
        Self {
            lifecycle: LifecycleCell::new(),
            sleep: None,
            cache: None,
            metrics: None,
            cache_deadline: DEFAULT_CACHE_DEADLINE,
            conflict: None,
        }
    }

    pub fn sleep(mut self, adapter: Arc<dyn SleepPort>) -> Self {
        match &self.sleep {
            Some(existing) => {
                let err = rebinding_error(SLEEP_PORT, existing.name(), adapter.name());
                self.conflict.get_or_insert(err);
            }
            None => self.sleep = Some(adapter),
        }
        self
    }

    pub fn cache(mut self, adapter: Arc<dyn CachePort>) -> Self {
        match &self.cache {
            Some(existing) => {
                let err = rebinding_error(CACHE_PORT, existing.name(), adapter.name());
                self.conflict.get_or_insert(err);
            }
            None => self.cache = Some(adapter),
        }
        self
    }

    pub fn metrics(mut self, adapter: Arc<dyn MetricsPort>) -> Self {
        match &self.metrics {
            Some(existing) => {
                let err = rebinding_error(METRICS_PORT, existing.name(), adapter.name());
                self.conflict.get_or_insert(err);
            }
            None => self.metrics = Some(adapter),
        }
        self
    }

    /// Upper bound for a single cache read before it fails with `Error::Timeout`.
    pub fn cache_deadline(mut self, deadline: Duration) -> Self {
        self.cache_deadline = deadline;
        self
    }

    /// Fails fast when any port is missing or was bound twice.
    pub fn bind(self) -> Result<PortBindings> {
        let PortBindingsBuilder {
            lifecycle,
            sleep,
            cache,
            metrics,
            cache_deadline,
            conflict,
        } = self;

        lifecycle.transition(Lifecycle::Unbound, Lifecycle::Binding);

        if let Some(err) = conflict {
            error!("Port binding failed: {}", err);
            return Err(err);
        }
        let sleep = sleep.ok_or_else(|| missing_adapter(SLEEP_PORT))?;
        let cache = cache.ok_or_else(|| missing_adapter(CACHE_PORT))?;
        let metrics = metrics.ok_or_else(|| missing_adapter(METRICS_PORT))?;

        lifecycle.transition(Lifecycle::Binding, Lifecycle::Bound);
        info!(
            "Ports bound: {} -> {}, {} -> {}, {} -> {} (deadline {:?})",
            SLEEP_PORT,
            sleep.name(),
            CACHE_PORT,
            cache.name(),
            METRICS_PORT,
            metrics.name(),
            cache_deadline
        );

        Ok(PortBindings {
            inner: Arc::new(Inner {
                sleep,
                cache,
                metrics,
                cache_deadline,
                lifecycle,
                in_flight: AtomicUsize::new(0),
                drained: Notify::new(),
                terminated: Notify::new(),
                root: Interrupt::new(),
            }),
        })
    }
}

fn missing_adapter(port: &'static str) -> Error {
    let err = Error::Binding {
        port,
        reason: "no adapter registered".to_string(),
    };
    error!("Port binding failed: {}", err);
    err
}

fn rebinding_error(port: &'static str, existing: &str, offered: &str) -> Error {
    Error::Binding {
        port,
        reason: format!("already bound to '{}', refusing '{}'", existing, offered),
    }
}

struct Inner {
    sleep: Arc<dyn SleepPort>,
    cache: Arc<dyn CachePort>,
    metrics: Arc<dyn MetricsPort>,
    cache_deadline: Duration,
    lifecycle: LifecycleCell,
    in_flight: AtomicUsize,
    drained: Notify,
    terminated: Notify,
    root: Interrupt,
}

/// The process-wide binding table, passed explicitly to whatever consumes ports.
#[derive(Clone)]
pub struct PortBindings {
    inner: Arc<Inner>,
}

impl Debug for PortBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortBindings")
            .field("sleep", &self.inner.sleep.name())
            .field("cache", &self.inner.cache.name())
            .field("metrics", &self.inner.metrics.name())
            .field("state", &self.state())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

struct InvocationGuard<'a> {
    inner: &'a Inner,
}

impl Drop for InvocationGuard<'_> {
    fn drop(&mut self) {
        if self.inner.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.drained.notify_waiters();
        }
    }
}

impl PortBindings {
    pub fn builder() -> PortBindingsBuilder {
        PortBindingsBuilder::new()
    }

    pub fn state(&self) -> Lifecycle {
        match self.inner.lifecycle.get() {
            Lifecycle::Bound if self.in_flight() > 0 => Lifecycle::Active,
            state => state,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// A child of the process-wide interrupt; fires on `shutdown`.
    pub fn interrupt(&self) -> Interrupt {
        self.inner.root.child()
    }

    pub fn sleep_adapter(&self) -> &'static str {
        self.inner.sleep.name()
    }

    pub fn cache_adapter(&self) -> &'static str {
        self.inner.cache.name()
    }

    pub fn metrics_adapter(&self) -> &'static str {
        self.inner.metrics.name()
    }

    pub fn cache_deadline(&self) -> Duration {
        self.inner.cache_deadline
    }

    /// `MetricsPort.increment_hello_request` through the bound adapter.
    pub fn record_hello(&self, endpoint_tag: &'static str) -> Result<()> {
        let _guard = self.enter()?;
        self.inner.metrics.increment_hello_request(endpoint_tag);
        Ok(())
    }

    pub fn hello_requests(&self) -> Vec<(&'static str, u64)> {
        self.inner.metrics.hello_requests()
    }

    fn enter(&self) -> Result<InvocationGuard<'_>> {
        self.inner.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InvocationGuard { inner: &self.inner };
        let state = self.inner.lifecycle.get();
        if !state.accepts_invocations() {
            return Err(Error::Lifecycle(state.as_str()));
        }
        Ok(guard)
    }

    /// `SleepPort.sleep` through the bound adapter.
    pub async fn sleep(
        &self,
        amount: i64,
        unit: Option<TimeUnit>,
        interrupt: &Interrupt,
    ) -> Result<()> {
        let request = DurationRequest::new(amount, unit)?;
        let _guard = self.enter()?;

        let outcome = tokio::select! {
            biased;
            _ = self.inner.root.triggered() => Err(Error::Interrupted),
            outcome = self.inner.sleep.sleep(request, interrupt) => outcome,
        };

        if let Err(Error::Interrupted) = outcome {
            debug!("Sleep of {} on '{}' interrupted", request, self.sleep_adapter());
        }
        outcome
    }

    /// `CachePort.get` through the bound adapter, bounded by the cache deadline.
    pub async fn get(&self, key: &str) -> Result<Lookup> {
        self.get_within(key, self.inner.cache_deadline).await
    }

    /// `CachePort.get` bounded by a caller-supplied deadline instead of the configured one.
    pub async fn get_within(&self, key: &str, deadline: Duration) -> Result<Lookup> {
        let key = CacheKey::parse(key)?;
        let _guard = self.enter()?;

        let outcome = self.inner.cache.get_within(&key, deadline).await;

        match &outcome {
            Ok(Lookup::Miss) => trace!("Cache miss for key '{}'", key),
            Ok(Lookup::Hit(_)) => {}
            Err(e) => warn!("Cache read for key '{}' on '{}' failed: {}", key, self.cache_adapter(), e),
        }
        outcome
    }

    /// Stops accepting invocations, interrupts in-flight sleeps, and waits for them to drain.
    /// Concurrent callers all return once the bindings are `Terminated`.
    pub async fn shutdown(&self) {
        if !self
            .inner
            .lifecycle
            .transition(Lifecycle::Bound, Lifecycle::ShuttingDown)
        {
            loop {
                let terminated = self.inner.terminated.notified();
                if self.inner.lifecycle.get() != Lifecycle::ShuttingDown {
                    break;
                }
                debug!("Shutdown already in progress, waiting for it to finish");
                terminated.await;
            }
            return;
        }

        info!("Port bindings shutting down ({} in flight)", self.in_flight());
        self.inner.root.trigger();

        loop {
            let drained = self.inner.drained.notified();
            if self.in_flight() == 0 {
                break;
            }
            drained.await;
        }

        self.inner
            .lifecycle
            .transition(Lifecycle::ShuttingDown, Lifecycle::Terminated);
        self.inner.terminated.notify_waiters();

        for (tag, count) in self.hello_requests() {
            info!("{}: {} requests", tag, count);
        }
        info!("Port bindings terminated");
    }
}

/// Bootstrap path: selects adapters by configured name and binds them.
pub async fn bind_from_config(
    config: &Config,
    sleep_factory: &dyn SleepFactory,
    storage_factory: &dyn StorageFactory,
    metrics: Arc<dyn MetricsPort>,
) -> Result<PortBindings> {
    let sleep = sleep_factory.create(&config.sleep_impl)?;
    let cache_config = CacheConfig::new(config.cache_impl.clone(), config.cache_size);
    let cache = storage_factory.create_from_config(&cache_config).await?;

    PortBindings::builder()
        .sleep(sleep)
        .cache(cache)
        .metrics(metrics)
        .cache_deadline(config.cache_timeout)
        .bind()
}

use crate::domain::{HelloMode, Lookup};
use crate::interrupt::Interrupt;
use async_trait::async_trait;
use shared::Result;

/// Benchmark-invariant operations every host variant exposes.
#[async_trait]
pub trait HelloOperations: Send + Sync + 'static {
    /// Optional sleep in seconds, then a read of the hot key.
    async fn hello(&self, mode: HelloMode, sleep_seconds: i64, interrupt: &Interrupt)
    -> Result<String>;

    /// Read of an arbitrary key, used by unique-key load tests.
    async fn lookup(&self, key: &str) -> Result<Lookup>;

    /// A per-invocation interrupt tied to process shutdown.
    fn interrupt(&self) -> Interrupt;

    /// Hello requests counted so far, per endpoint tag.
    fn hello_requests(&self) -> Vec<(&'static str, u64)>;
}

pub mod thread_sleep;
pub mod tokio_sleep;

use bench_core::ports::{SleepFactory, SleepPort};
use shared::{Error, Result};
use std::sync::Arc;
use tracing::info;

pub use thread_sleep::ThreadSleep;
pub use tokio_sleep::TokioSleep;

pub const SLEEP_IMPLS: &[&str] = &["tokio", "thread"];

/// Selects a sleep adapter by name.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnifiedSleepFactory;

impl SleepFactory for UnifiedSleepFactory {
    fn available(&self) -> &'static [&'static str] {
        SLEEP_IMPLS
    }

    fn create(&self, kind: &str) -> Result<Arc<dyn SleepPort>> {
        info!("SLEEP_IMPL: {}", kind);
        match kind {
            "" | "tokio" => Ok(Arc::new(TokioSleep)),
            "thread" => Ok(Arc::new(ThreadSleep)),
            other => Err(Error::Binding {
                port: "SleepPort",
                reason: format!(
                    "unknown SLEEP_IMPL '{}' (supported: {})",
                    other,
                    SLEEP_IMPLS.join(",")
                ),
            }),
        }
    }
}

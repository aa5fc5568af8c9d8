use async_trait::async_trait;
use bench_core::ports::SleepPort;
use bench_core::{DurationRequest, Interrupt};
use shared::{Error, Result};

/// Suspends the calling task on the tokio timer; the worker thread stays free.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleep;

#[async_trait]
impl SleepPort for TokioSleep {
    fn name(&self) -> &'static str {
        "tokio"
    }

    async fn sleep(&self, request: DurationRequest, interrupt: &Interrupt) -> Result<()> {
        tokio::select! {
            biased;
            _ = interrupt.triggered() => Err(Error::Interrupted),
            _ = tokio::time::sleep(request.duration()) => Ok(()),
        }
    }
}

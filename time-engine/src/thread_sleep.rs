use async_trait::async_trait;
use bench_core::ports::SleepPort;
use bench_core::{DurationRequest, Interrupt};
use shared::{Error, Result};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Blocks a thread from the runtime's blocking pool for the whole duration,
/// the way a thread-per-request host would. Async workers are never blocked.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleep;

#[async_trait]
impl SleepPort for ThreadSleep {
    fn name(&self) -> &'static str {
        "thread"
    }

    async fn sleep(&self, request: DurationRequest, interrupt: &Interrupt) -> Result<()> {
        if interrupt.is_triggered() {
            return Err(Error::Interrupted);
        }

        let signal = Arc::new(WakeSignal::default());
        // Dropping the caller's future releases the pool thread too.
        let _wake_on_drop = WakeOnDrop(signal.clone());

        let worker = signal.clone();
        let duration = request.duration();
        let mut handle = tokio::task::spawn_blocking(move || worker.wait_for(duration));

        let joined = tokio::select! {
            joined = &mut handle => joined,
            _ = interrupt.triggered() => {
                signal.wake();
                handle.await
            }
        };

        match joined {
            Ok(Wait::Elapsed) => Ok(()),
            Ok(Wait::Woken) => Err(Error::Interrupted),
            Err(e) => Err(Error::Internal(format!("sleep thread failed: {}", e))),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Wait {
    Elapsed,
    Woken,
}

#[derive(Default)]
struct WakeSignal {
    woken: Mutex<bool>,
    cond: Condvar,
}

impl WakeSignal {
    /// Blocks until `duration` has elapsed on the monotonic clock or `wake` is called.
    fn wait_for(&self, duration: Duration) -> Wait {
        // Unrepresentable deadlines only end on `wake`.
        let deadline = Instant::now().checked_add(duration);
        let mut woken = self.woken.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if *woken {
                return Wait::Woken;
            }
            woken = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Wait::Elapsed;
                    }
                    // Spurious wakeups loop back and re-check the deadline.
                    match self.cond.wait_timeout(woken, remaining) {
                        Ok((guard, _)) => guard,
                        Err(e) => e.into_inner().0,
                    }
                }
                None => self.cond.wait(woken).unwrap_or_else(|e| e.into_inner()),
            };
        }
    }

    fn wake(&self) {
        let mut woken = self.woken.lock().unwrap_or_else(|e| e.into_inner());
        *woken = true;
        self.cond.notify_all();
    }
}

struct WakeOnDrop(Arc<WakeSignal>);

impl Drop for WakeOnDrop {
    fn drop(&mut self) {
        self.0.wake();
    }
}

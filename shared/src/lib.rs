// shared/src/lib.rs

use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Caller bug caught at the call boundary; never reaches an adapter.
    #[error("precondition violated: {0}")]
    Precondition(String),
    #[error("sleep interrupted")]
    Interrupted,
    #[error("backing store timed out after {0:?}")]
    Timeout(Duration),
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
    #[error("not found")]
    NotFound,
    #[error("no adapter bound for {port}: {reason}")]
    Binding { port: &'static str, reason: String },
    #[error("port invoked while {0}")]
    Lifecycle(&'static str),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    /// Failures a caller may reasonably retry. Ports never retry on their own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Interrupted | Error::Timeout(_) | Error::Unavailable(_)
        )
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Error::Precondition(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
pub mod telemetry;

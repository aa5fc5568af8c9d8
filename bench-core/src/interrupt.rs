use tokio_util::sync::CancellationToken;

/// External interruption signal for an in-flight port call.
///
/// Children fire when their parent fires, so triggering the process-wide
/// root reaches every sleep that was handed a child.
#[derive(Clone, Debug, Default)]
pub struct Interrupt {
    token: CancellationToken,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once this handle (or an ancestor) has been triggered.
    pub async fn triggered(&self) {
        self.token.cancelled().await
    }
}

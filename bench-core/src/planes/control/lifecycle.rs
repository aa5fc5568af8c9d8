use std::sync::atomic::{AtomicU8, Ordering};

/// Per-process binding state.
///
/// `Active` is never stored: it is reported while the bindings are `Bound`
/// and at least one port invocation is in flight.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Unbound = 0,
    Binding = 1,
    Bound = 2,
    Active = 3,
    ShuttingDown = 4,
    Terminated = 5,
}

impl Lifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            Lifecycle::Unbound => "unbound",
            Lifecycle::Binding => "binding",
            Lifecycle::Bound => "bound",
            Lifecycle::Active => "active",
            Lifecycle::ShuttingDown => "shutting down",
            Lifecycle::Terminated => "terminated",
        }
    }

    pub fn accepts_invocations(self) -> bool {
        matches!(self, Lifecycle::Bound | Lifecycle::Active)
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Lifecycle::Unbound,
            1 => Lifecycle::Binding,
            2 => Lifecycle::Bound,
            3 => Lifecycle::Active,
            4 => Lifecycle::ShuttingDown,
            _ => Lifecycle::Terminated,
        }
    }
}

#[derive(Debug)]
pub(crate) struct LifecycleCell(AtomicU8);

impl LifecycleCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(Lifecycle::Unbound as u8))
    }

    pub(crate) fn get(&self) -> Lifecycle {
        Lifecycle::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from -> to` atomically; false if the current state is not `from`.
    pub(crate) fn transition(&self, from: Lifecycle, to: Lifecycle) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

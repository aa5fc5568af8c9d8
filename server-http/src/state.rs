use bench_core::{HelloOperations, HelloService, PortBindings};
use std::sync::Arc;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub hello: Arc<dyn HelloOperations>,
}

impl AppState {
    pub fn new(hello: Arc<dyn HelloOperations>) -> Self {
        Self { hello }
    }

    pub fn from_bindings(bindings: PortBindings) -> Self {
        Self::new(Arc::new(HelloService::new(bindings)))
    }
}

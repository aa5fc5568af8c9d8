pub mod binding;
pub mod lifecycle;

pub use binding::{PortBindings, PortBindingsBuilder, bind_from_config};
pub use lifecycle::Lifecycle;

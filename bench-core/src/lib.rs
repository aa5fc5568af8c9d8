#![deny(clippy::all)]

pub mod domain;
pub mod interrupt;
pub mod planes;
pub mod ports;
pub mod signal;

pub use domain::{CacheConfig, CacheKey, DurationRequest, HelloMode, Lookup, TimeUnit};
pub use interrupt::Interrupt;
pub use planes::control::{Lifecycle, PortBindings, bind_from_config};
pub use planes::data::{HelloOperations, HelloService};
pub use ports::{
    CachePort, CachePortExt, MetricsPort, SleepFactory, SleepPort, SleepPortExt, StorageFactory,
};

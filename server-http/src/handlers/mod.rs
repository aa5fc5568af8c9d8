pub mod health;
pub mod hello;

pub use health::health_check;
pub use hello::{hello, lookup, metrics};

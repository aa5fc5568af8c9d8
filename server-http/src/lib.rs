pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;

// Re-export key types
pub use routes::build_router;
pub use state::AppState;

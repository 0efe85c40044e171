//! HTTP layer for the auth service
//!
//! Library exports for integration tests and the binary.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::create_app;
pub use routes::auth::AppState;

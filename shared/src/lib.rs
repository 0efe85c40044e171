//! Shared configuration and common types for the auth service
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error response envelope and error codes
//! - API response wrappers and health check types

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CookieConfig, DatabaseConfig, Environment, JwksConfig, JwtConfig,
    ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{ApiResponse, HealthResponse, HealthStatus};

//! # Auth Core
//!
//! Domain layer for the auth service.
//! This crate contains domain entities, the token services (key provider,
//! issuer, verifiers, remote key-set cache), the session rotation service,
//! repository interfaces with in-memory implementations, and error types.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::*;
pub use services::*;
pub use repositories::*;
pub use errors::*;

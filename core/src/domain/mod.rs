//! Domain layer containing the user principal and token entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;

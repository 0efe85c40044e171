//! # Infrastructure Layer
//!
//! Concrete implementations of the stores and fetchers the token lifecycle
//! depends on:
//! - **Database**: MySQL refresh token and user repositories using SQLx
//! - **JWKS**: HTTP retrieval of a remote key-set document

pub use auth_core::errors::*;

use auth_core::errors::{DomainError, TokenError};

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Remote key-set retrieval over HTTP
pub mod jwks;

pub use database::{DatabasePool, MySqlRefreshTokenRepository, MySqlUserRepository, PoolStatistics};
pub use jwks::HttpJwksFetcher;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// HTTP request error for the key-set endpoint
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Database(e) => TokenError::StoreUnavailable {
                message: e.to_string(),
            }
            .into(),
            InfrastructureError::Http(e) => TokenError::KeyUnavailable {
                message: e.to_string(),
            }
            .into(),
            other => DomainError::Internal {
                message: other.to_string(),
            },
        }
    }
}

//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, TokenError};

use auth_shared::error_codes;
use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => error_codes::NOT_FOUND,
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
            DomainError::Auth(e) => e.error_code(),
            DomainError::Token(e) => e.error_code(),
        }
    }

    /// The wrapped token error, if any
    pub fn as_token_error(&self) -> Option<&TokenError> {
        match self {
            DomainError::Token(e) => Some(e),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

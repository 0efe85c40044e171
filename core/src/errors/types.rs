//! Error types for authentication and token lifecycle operations
//!
//! Messages here are for logs and response bodies; the HTTP status for each
//! variant is chosen by the presentation layer.

use auth_shared::error_codes;
use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

impl AuthError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::UserNotFound => error_codes::USER_NOT_FOUND,
            AuthError::AccountInactive => error_codes::ACCOUNT_INACTIVE,
            AuthError::InsufficientPermissions => error_codes::FORBIDDEN,
        }
    }
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// No key could be loaded or fetched to sign or verify with
    #[error("Key unavailable: {message}")]
    KeyUnavailable { message: String },

    /// Bad encoding, bad signature, wrong algorithm, wrong issuer or unknown key id
    #[error("Malformed token")]
    TokenMalformed,

    #[error("Token expired")]
    TokenExpired,

    /// The referenced refresh record no longer exists
    #[error("Token revoked")]
    TokenRevoked,

    /// The refresh token store failed or timed out
    #[error("Token store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// The record to rotate was already deleted
    #[error("Refresh token record not found")]
    RecordNotFound,

    #[error("No token provided")]
    MissingToken,
}

impl TokenError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::KeyUnavailable { .. } => error_codes::KEY_UNAVAILABLE,
            TokenError::TokenMalformed => error_codes::TOKEN_INVALID,
            TokenError::TokenExpired => error_codes::TOKEN_EXPIRED,
            TokenError::TokenRevoked | TokenError::RecordNotFound => error_codes::TOKEN_REVOKED,
            TokenError::StoreUnavailable { .. } => error_codes::STORE_UNAVAILABLE,
            TokenError::MissingToken => error_codes::TOKEN_MISSING,
        }
    }

    /// Whether the error means the refresh token is no longer live
    pub fn is_revocation(&self) -> bool {
        matches!(self, TokenError::TokenRevoked | TokenError::RecordNotFound)
    }

    /// Whether the failure lies with infrastructure rather than the client
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            TokenError::KeyUnavailable { .. } | TokenError::StoreUnavailable { .. }
        )
    }

    pub(crate) fn key_unavailable(message: impl Into<String>) -> Self {
        TokenError::KeyUnavailable { message: message.into() }
    }

    pub(crate) fn store_unavailable(message: impl Into<String>) -> Self {
        TokenError::StoreUnavailable { message: message.into() }
    }
}

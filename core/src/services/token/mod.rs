//! Token services
//!
//! This module handles all token-related operations including:
//! - RS256 key loading and key-set publication
//! - Access and refresh token minting
//! - Access token verification against local or remote key sets
//! - Refresh token verification with a revocation lookup
//! - Background cleanup of expired refresh token records

mod cleanup;
mod config;
mod issuer;
mod jwks;
mod key_manager;
mod remote;
mod verifier;

#[cfg(test)]
pub(crate) mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use config::{JwksCacheConfig, TokenServiceConfig};
pub use issuer::TokenIssuer;
pub use jwks::{select_key, RsaPublicComponents};
pub use key_manager::KeyProvider;
pub use remote::{JwksCache, JwksFetcher};
pub use verifier::{AccessTokenVerifier, RefreshTokenVerifier, VerificationKeySource};

//! Access and refresh token minting

use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::domain::entities::token::{AccessTokenClaims, Principal, RefreshTokenClaims};
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;
use super::key_manager::KeyProvider;

/// Mints tokens; never touches the store
pub struct TokenIssuer {
    keys: Arc<KeyProvider>,
    refresh_key: EncodingKey,
    config: TokenServiceConfig,
}

impl TokenIssuer {
    pub fn new(keys: Arc<KeyProvider>, config: TokenServiceConfig) -> Self {
        let refresh_key = EncodingKey::from_secret(config.refresh_secret.as_bytes());
        Self {
            keys,
            refresh_key,
            config,
        }
    }

    /// Issues an RS256 access token carrying the signing key's `kid`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The signed token
    /// * `Err(DomainError)` - `KeyUnavailable` if signing failed
    pub fn issue_access_token(&self, principal: &Principal) -> Result<String, DomainError> {
        let claims = AccessTokenClaims::new(
            principal,
            &self.config.issuer,
            self.config.access_token_lifetime,
        );

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.keys.key_id().to_string());

        encode(&header, &claims, self.keys.signing_key()).map_err(|e| {
            TokenError::key_unavailable(format!("Access token signing failed: {}", e)).into()
        })
    }

    /// Issues an HS256 refresh token whose `jti` is `token_id`
    ///
    /// The record `token_id` must already exist.
    pub fn issue_refresh_token(
        &self,
        principal: &Principal,
        token_id: i64,
    ) -> Result<String, DomainError> {
        let claims = RefreshTokenClaims::new(
            principal,
            token_id,
            &self.config.issuer,
            self.config.refresh_token_lifetime,
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_key).map_err(|e| {
            TokenError::key_unavailable(format!("Refresh token signing failed: {}", e)).into()
        })
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }
}

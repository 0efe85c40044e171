//! Access and refresh token verification

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use tracing::{debug, error};

use crate::domain::entities::token::{AccessTokenClaims, RefreshTokenClaims};
use crate::errors::{DomainError, TokenError};
use crate::repositories::RefreshTokenRepository;

use super::config::TokenServiceConfig;

/// Where access token verification keys come from
///
/// Implemented by the local [`KeyProvider`](super::KeyProvider) and by the
/// remote [`JwksCache`](super::JwksCache).
#[async_trait]
pub trait VerificationKeySource: Send + Sync {
    /// Key for the given `kid`
    ///
    /// # Returns
    /// * `Ok(DecodingKey)` - A key is known for this id
    /// * `Err(TokenMalformed)` - No key with this id exists
    /// * `Err(KeyUnavailable)` - The key set could not be obtained
    async fn verification_key(&self, kid: Option<&str>) -> Result<DecodingKey, DomainError>;
}

/// Map a decode failure: expiry is reported as such, everything else is malformed
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        other => {
            debug!(reason = ?other, "Token rejected");
            TokenError::TokenMalformed
        }
    }
}

fn strict_validation(algorithm: Algorithm, issuer: &str) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.set_issuer(&[issuer]);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation
}

/// Stateless RS256 access token verifier
#[derive(Clone)]
pub struct AccessTokenVerifier {
    keys: Arc<dyn VerificationKeySource>,
    validation: Validation,
}

impl AccessTokenVerifier {
    /// Creates a verifier checking tokens from `issuer` against `keys`
    pub fn new(keys: Arc<dyn VerificationKeySource>, issuer: &str) -> Self {
        Self {
            keys,
            validation: strict_validation(Algorithm::RS256, issuer),
        }
    }

    /// Verifies an access token and returns its claims
    ///
    /// # Returns
    ///
    /// * `Ok(AccessTokenClaims)` - Signature, algorithm, issuer and expiry all check out
    /// * `Err(TokenExpired)` - Past `exp`, with zero leeway
    /// * `Err(TokenMalformed)` - Anything else about the token is wrong
    /// * `Err(KeyUnavailable)` - The key set could not be obtained
    pub async fn verify(&self, token: &str) -> Result<AccessTokenClaims, DomainError> {
        let header = decode_header(token).map_err(map_jwt_error)?;
        if header.alg != Algorithm::RS256 {
            debug!(alg = ?header.alg, "Access token with unexpected algorithm");
            return Err(TokenError::TokenMalformed.into());
        }

        let key = self.keys.verification_key(header.kid.as_deref()).await?;

        let data = decode::<AccessTokenClaims>(token, &key, &self.validation)
            .map_err(map_jwt_error)?;

        Ok(data.claims)
    }
}

/// HS256 refresh token verifier backed by the revocation store
///
/// Fails closed: a store error or timeout is never reported as success.
pub struct RefreshTokenVerifier<R: RefreshTokenRepository> {
    repository: Arc<R>,
    decoding_key: DecodingKey,
    validation: Validation,
    store_timeout: Duration,
}

impl<R: RefreshTokenRepository> RefreshTokenVerifier<R> {
    pub fn new(repository: Arc<R>, config: &TokenServiceConfig) -> Self {
        Self {
            repository,
            decoding_key: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            validation: strict_validation(Algorithm::HS256, &config.issuer),
            store_timeout: config.store_timeout,
        }
    }

    /// Verifies a refresh token and checks its record still exists
    ///
    /// # Returns
    ///
    /// * `Ok(RefreshTokenClaims)` - Valid and backed by a live record
    /// * `Err(TokenRevoked)` - The record is gone or owned by someone else
    /// * `Err(StoreUnavailable)` - The store failed or timed out
    /// * `Err(TokenExpired | TokenMalformed)` - The token itself is bad
    pub async fn verify(&self, token: &str) -> Result<RefreshTokenClaims, DomainError> {
        let data = decode::<RefreshTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(map_jwt_error)?;
        let claims = data.claims;

        let (token_id, owner_id) = match (claims.token_id(), claims.owner_id()) {
            (Some(token_id), Some(owner_id)) => (token_id, owner_id),
            _ => {
                debug!("Refresh token with non-numeric jti or sub");
                return Err(TokenError::TokenMalformed.into());
            }
        };

        let lookup = tokio::time::timeout(
            self.store_timeout,
            self.repository.exists(token_id, owner_id),
        )
        .await;

        match lookup {
            Ok(Ok(true)) => Ok(claims),
            Ok(Ok(false)) => {
                debug!(token_id, owner_id, "No live refresh record for token");
                Err(TokenError::TokenRevoked.into())
            }
            Ok(Err(e)) => {
                error!(token_id, error = %e, "Revocation check failed");
                Err(TokenError::store_unavailable(e.to_string()).into())
            }
            Err(_) => {
                let timeout_ms = self.store_timeout.as_millis() as u64;
                error!(token_id, timeout_ms, "Revocation check timed out");
                Err(TokenError::store_unavailable("revocation check timed out").into())
            }
        }
    }
}

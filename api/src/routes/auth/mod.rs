//! Authentication route handlers
//!
//! - Token refresh (rotation)
//! - Logout
//! - Current user lookup and account deactivation
//! - Key-set publication

pub mod cookies;
pub mod keys;
pub mod logout;
pub mod refresh;
pub mod session;

use std::sync::Arc;

use auth_core::repositories::{RefreshTokenRepository, UserRepository};
use auth_core::services::token::{
    AccessTokenVerifier, KeyProvider, RefreshTokenVerifier, TokenIssuer, TokenServiceConfig,
    VerificationKeySource,
};
use auth_core::services::SessionService;
use auth_infra::DatabasePool;
use auth_shared::CookieConfig;

/// Application state shared by all handlers and middlewares
pub struct AppState<R: RefreshTokenRepository, U: UserRepository> {
    pub sessions: Arc<SessionService<R, U>>,
    pub access_verifier: AccessTokenVerifier,
    pub refresh_verifier: Arc<RefreshTokenVerifier<R>>,
    /// Local signing key, published at `/.well-known/jwks.json`
    pub keys: Arc<KeyProvider>,
    pub cookies: CookieConfig,
    /// Checked by `/health` when present
    pub database: Option<DatabasePool>,
}

impl<R: RefreshTokenRepository, U: UserRepository> AppState<R, U> {
    /// Wire the token services together
    ///
    /// # Arguments
    /// * `refresh_tokens` - Refresh token record store
    /// * `users` - User lookup
    /// * `keys` - Local signing key
    /// * `key_source` - Where access tokens are verified against, local or remote
    /// * `config` - Issuer, lifetimes, refresh secret and store timeout
    /// * `cookies` - Cookie names and attributes
    pub fn new(
        refresh_tokens: Arc<R>,
        users: Arc<U>,
        keys: Arc<KeyProvider>,
        key_source: Arc<dyn VerificationKeySource>,
        config: TokenServiceConfig,
        cookies: CookieConfig,
    ) -> Self {
        let access_verifier = AccessTokenVerifier::new(key_source, &config.issuer);
        let refresh_verifier = Arc::new(RefreshTokenVerifier::new(refresh_tokens.clone(), &config));
        let issuer = Arc::new(TokenIssuer::new(keys.clone(), config));
        let sessions = Arc::new(SessionService::new(refresh_tokens, users, issuer));

        Self {
            sessions,
            access_verifier,
            refresh_verifier,
            keys,
            cookies,
            database: None,
        }
    }

    pub fn with_database(mut self, pool: DatabasePool) -> Self {
        self.database = Some(pool);
        self
    }
}

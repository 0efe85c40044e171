//! Shared fixtures for HTTP tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use auth_api::AppState;
use auth_core::domain::entities::token::{RefreshTokenRecord, TokenPair};
use auth_core::domain::entities::user::{Role, User};
use auth_core::errors::{DomainError, TokenError};
use auth_core::repositories::{
    InMemoryRefreshTokenRepository, InMemoryUserRepository, RefreshTokenRepository,
    UserRepository,
};
use auth_core::services::token::{KeyProvider, TokenIssuer, TokenServiceConfig};
use auth_shared::CookieConfig;

pub const PRIVATE_KEY: &str = include_str!("../../../core/tests/fixtures/rsa_private.pem");

pub fn token_config() -> TokenServiceConfig {
    TokenServiceConfig::with_secret("http-test-secret")
}

pub fn keys() -> Arc<KeyProvider> {
    Arc::new(KeyProvider::from_pem(PRIVATE_KEY).unwrap())
}

pub struct TestContext {
    pub state: web::Data<AppState<InMemoryRefreshTokenRepository, InMemoryUserRepository>>,
    pub tokens: Arc<InMemoryRefreshTokenRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub keys: Arc<KeyProvider>,
}

impl TestContext {
    pub fn new() -> Self {
        let tokens = Arc::new(InMemoryRefreshTokenRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let keys = keys();

        let state = AppState::new(
            tokens.clone(),
            users.clone(),
            keys.clone(),
            keys.clone(),
            token_config(),
            CookieConfig::default(),
        );

        Self {
            state: web::Data::new(state),
            tokens,
            users,
            keys,
        }
    }

    pub async fn user(&self, email: &str, role: Role) -> User {
        self.users
            .create(User::new(email, "Test", "User", role))
            .await
            .unwrap()
    }

    /// Log a user in the way the login collaborator would
    pub async fn login(&self, user: &User) -> TokenPair {
        self.state.sessions.start_session(user).await.unwrap()
    }

    /// An access token for `user` that expired a minute ago
    pub fn expired_access_token(&self, user: &User) -> String {
        let config = TokenServiceConfig {
            access_token_lifetime: chrono::Duration::seconds(-60),
            ..token_config()
        };
        TokenIssuer::new(self.keys.clone(), config)
            .issue_access_token(&user.principal())
            .unwrap()
    }
}

/// Store whose every call fails
pub struct UnavailableStore;

impl UnavailableStore {
    fn error<T>() -> Result<T, DomainError> {
        Err(TokenError::StoreUnavailable {
            message: "connection refused".to_string(),
        }
        .into())
    }
}

#[async_trait]
impl RefreshTokenRepository for UnavailableStore {
    async fn create(&self, _: i64, _: DateTime<Utc>) -> Result<RefreshTokenRecord, DomainError> {
        Self::error()
    }

    async fn exists(&self, _: i64, _: i64) -> Result<bool, DomainError> {
        Self::error()
    }

    async fn delete(&self, _: i64) -> Result<bool, DomainError> {
        Self::error()
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        Self::error()
    }

    async fn delete_all_for_owner(&self, _: i64) -> Result<usize, DomainError> {
        Self::error()
    }
}

/// Store where another request always wins the race to delete a record
#[derive(Default)]
pub struct LostRaceStore {
    pub inner: InMemoryRefreshTokenRepository,
}

#[async_trait]
impl RefreshTokenRepository for LostRaceStore {
    async fn create(
        &self,
        owner_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, DomainError> {
        self.inner.create(owner_id, expires_at).await
    }

    async fn exists(&self, id: i64, owner_id: i64) -> Result<bool, DomainError> {
        self.inner.exists(id, owner_id).await
    }

    async fn delete(&self, _: i64) -> Result<bool, DomainError> {
        Ok(false)
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        self.inner.delete_expired().await
    }

    async fn delete_all_for_owner(&self, owner_id: i64) -> Result<usize, DomainError> {
        self.inner.delete_all_for_owner(owner_id).await
    }
}

//! Fixtures for session service tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::domain::entities::user::User;
use crate::errors::{DomainError, TokenError};
use crate::repositories::{InMemoryRefreshTokenRepository, RefreshTokenRepository, UserRepository};

mod service_tests;

fn unavailable<T>() -> Result<T, DomainError> {
    Err(TokenError::StoreUnavailable {
        message: "connection reset".to_string(),
    }
    .into())
}

/// User store whose every call outlives the store timeout
pub(crate) struct HangingUsers;

impl HangingUsers {
    async fn hang<T>() -> Result<T, DomainError> {
        tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        unavailable()
    }
}

#[async_trait]
impl UserRepository for HangingUsers {
    async fn find_by_id(&self, _: i64) -> Result<Option<User>, DomainError> {
        Self::hang().await
    }

    async fn create(&self, _: User) -> Result<User, DomainError> {
        Self::hang().await
    }

    async fn set_active(&self, _: i64, _: bool) -> Result<bool, DomainError> {
        Self::hang().await
    }
}

/// How a [`StuckDelete`] store treats deletes of its pinned record
#[derive(Clone, Copy)]
pub(crate) enum DeleteFailure {
    Error,
    Hang,
}

/// In-memory store that cannot delete one pinned record
pub(crate) struct StuckDelete {
    pub(crate) inner: InMemoryRefreshTokenRepository,
    pub(crate) pinned: i64,
    pub(crate) failure: DeleteFailure,
}

#[async_trait]
impl RefreshTokenRepository for StuckDelete {
    async fn create(&self, owner_id: i64, expires_at: DateTime<Utc>) -> Result<RefreshTokenRecord, DomainError> {
        self.inner.create(owner_id, expires_at).await
    }

    async fn exists(&self, token_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        self.inner.exists(token_id, owner_id).await
    }

    async fn delete(&self, token_id: i64) -> Result<bool, DomainError> {
        if token_id != self.pinned {
            return self.inner.delete(token_id).await;
        }
        if let DeleteFailure::Hang = self.failure {
            tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        }
        unavailable()
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        self.inner.delete_expired().await
    }

    async fn delete_all_for_owner(&self, owner_id: i64) -> Result<usize, DomainError> {
        self.inner.delete_all_for_owner(owner_id).await
    }
}

//! Shared fixtures for token service tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::{DomainError, TokenError};
use crate::repositories::{InMemoryRefreshTokenRepository, RefreshTokenRepository};


pub(crate) const TEST_PRIVATE_KEY: &str = include_str!("../../../../tests/fixtures/rsa_private.pem");
pub(crate) const TEST_PRIVATE_KEY_PKCS1: &str =
    include_str!("../../../../tests/fixtures/rsa_private_pkcs1.pem");
pub(crate) const TEST_PRIVATE_KEY_ALT: &str =
    include_str!("../../../../tests/fixtures/rsa_private_alt.pem");

/// Store that never answers successfully
pub(crate) enum BrokenRepository {
    /// Every call errors
    Failing,
    /// Every call outlives any reasonable timeout
    Hanging,
}

impl BrokenRepository {
    async fn fail<T>(&self) -> Result<T, DomainError> {
        if let BrokenRepository::Hanging = self {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Err(TokenError::StoreUnavailable {
            message: "connection reset".to_string(),
        }
        .into())
    }
}

#[async_trait]
impl RefreshTokenRepository for BrokenRepository {
    async fn create(&self, _: i64, _: DateTime<Utc>) -> Result<RefreshTokenRecord, DomainError> {
        self.fail().await
    }

    async fn exists(&self, _: i64, _: i64) -> Result<bool, DomainError> {
        self.fail().await
    }

    async fn delete(&self, _: i64) -> Result<bool, DomainError> {
        self.fail().await
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        self.fail().await
    }

    async fn delete_all_for_owner(&self, _: i64) -> Result<usize, DomainError> {
        self.fail().await
    }
}

/// In-memory store that counts every call made against it
#[derive(Default)]
pub(crate) struct CountingRepository {
    pub(crate) inner: InMemoryRefreshTokenRepository,
    calls: AtomicUsize,
}

impl CountingRepository {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RefreshTokenRepository for CountingRepository {
    async fn create(&self, owner_id: i64, expires_at: DateTime<Utc>) -> Result<RefreshTokenRecord, DomainError> {
        self.count();
        self.inner.create(owner_id, expires_at).await
    }

    async fn exists(&self, token_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        self.count();
        self.inner.exists(token_id, owner_id).await
    }

    async fn delete(&self, token_id: i64) -> Result<bool, DomainError> {
        self.count();
        self.inner.delete(token_id).await
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        self.count();
        self.inner.delete_expired().await
    }

    async fn delete_all_for_owner(&self, owner_id: i64) -> Result<usize, DomainError> {
        self.count();
        self.inner.delete_all_for_owner(owner_id).await
    }
}

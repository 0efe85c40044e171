//! In-memory refresh token store used by tests and local runs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainError;

use super::r#trait::RefreshTokenRepository;

/// Refresh token store backed by a map, with auto-increment ids
#[derive(Clone)]
pub struct InMemoryRefreshTokenRepository {
    records: Arc<RwLock<HashMap<i64, RefreshTokenRecord>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryRefreshTokenRepository {
    /// Create an empty store whose first id is 1
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create an empty store whose first generated id is `first_id`
    pub fn starting_at(first_id: i64) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(first_id)),
        }
    }

    /// Number of records currently stored
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Ids of the records owned by `owner_id`, sorted
    pub async fn ids_for_owner(&self, owner_id: i64) -> Vec<i64> {
        let records = self.records.read().await;
        let mut ids: Vec<i64> = records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .map(|r| r.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for InMemoryRefreshTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(
        &self,
        owner_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let now = Utc::now();
        let record = RefreshTokenRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            owner_id,
            expires_at,
            created_at: now,
            updated_at: now,
        };

        self.records.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn exists(&self, token_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .get(&token_id)
            .map(|r| r.is_owned_by(owner_id) && !r.is_expired())
            .unwrap_or(false))
    }

    async fn delete(&self, token_id: i64) -> Result<bool, DomainError> {
        Ok(self.records.write().await.remove(&token_id).is_some())
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        let mut records = self.records.write().await;
        let initial_count = records.len();

        records.retain(|_, record| !record.is_expired());

        Ok(initial_count - records.len())
    }

    async fn delete_all_for_owner(&self, owner_id: i64) -> Result<usize, DomainError> {
        let mut records = self.records.write().await;
        let initial_count = records.len();

        records.retain(|_, record| record.owner_id != owner_id);

        Ok(initial_count - records.len())
    }
}

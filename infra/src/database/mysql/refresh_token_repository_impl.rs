//! MySQL implementation of the RefreshTokenRepository trait.
//!
//! A row in `refresh_tokens` is the only thing that keeps a refresh token
//! live. There is no revoked column; revocation deletes the row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use auth_core::domain::entities::token::RefreshTokenRecord;
use auth_core::errors::{DomainError, TokenError};
use auth_core::repositories::RefreshTokenRepository;

/// MySQL implementation of RefreshTokenRepository
pub struct MySqlRefreshTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRefreshTokenRepository {
    /// Create a new MySQL refresh token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// Every persistence failure surfaces as `StoreUnavailable` so callers fail closed
fn store_error(context: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(context, error = %e, "Refresh token store error");
    TokenError::StoreUnavailable {
        message: format!("{}: {}", context, e),
    }
    .into()
}

#[async_trait]
impl RefreshTokenRepository for MySqlRefreshTokenRepository {
    async fn create(
        &self,
        owner_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let now = Utc::now();
        let query = r#"
            INSERT INTO refresh_tokens (user_id, expires_at, created_at, updated_at)
            VALUES (?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(owner_id)
            .bind(expires_at)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to create refresh token record", e))?;

        Ok(RefreshTokenRecord {
            id: result.last_insert_id() as i64,
            owner_id,
            expires_at,
            created_at: now,
            updated_at: now,
        })
    }

    async fn exists(&self, token_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        let query = r#"
            SELECT COUNT(*) AS present
            FROM refresh_tokens
            WHERE id = ? AND user_id = ? AND expires_at > ?
        "#;

        let row = sqlx::query(query)
            .bind(token_id)
            .bind(owner_id)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error("Failed to check refresh token record", e))?;

        let present: i64 = row
            .try_get("present")
            .map_err(|e| store_error("present", e))?;

        Ok(present > 0)
    }

    async fn delete(&self, token_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE id = ?")
            .bind(token_id)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to delete refresh token record", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to delete expired refresh token records", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_all_for_owner(&self, owner_id: i64) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to delete refresh token records for owner", e))?;

        Ok(result.rows_affected() as usize)
    }
}

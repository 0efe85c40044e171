//! Refresh token store trait, the single source of truth for revocation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainError;

/// Repository trait for refresh token record persistence
///
/// A refresh token is live exactly while its record exists. Implementations
/// must not keep a revoked flag; revocation is deletion.
///
/// Persistence failures are reported as
/// [`TokenError::StoreUnavailable`](crate::errors::TokenError::StoreUnavailable)
/// so callers can fail closed.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Insert a new record and return it with its generated id
    ///
    /// Must complete before a refresh token referencing the id is signed.
    ///
    /// # Arguments
    /// * `owner_id` - User the token is issued to
    /// * `expires_at` - Same instant as the token's `exp`
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use auth_core::repositories::RefreshTokenRepository;
    /// # async fn example(repo: &impl RefreshTokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let record = repo.create(1, Utc::now() + Duration::days(7)).await?;
    /// println!("Refresh record {} created", record.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn create(
        &self,
        owner_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, DomainError>;

    /// Revocation oracle
    ///
    /// # Returns
    /// * `Ok(true)` - A record with this id exists and belongs to `owner_id`
    /// * `Ok(false)` - No such record, or it belongs to someone else
    /// * `Err(DomainError)` - The store could not answer
    async fn exists(&self, token_id: i64, owner_id: i64) -> Result<bool, DomainError>;

    /// Delete a record; deleting a missing record is not an error
    ///
    /// # Returns
    /// * `Ok(true)` - A record was removed
    /// * `Ok(false)` - Nothing to remove
    async fn delete(&self, token_id: i64) -> Result<bool, DomainError>;

    /// Delete records whose expiry has passed
    ///
    /// Called periodically by the cleanup service.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records deleted
    async fn delete_expired(&self) -> Result<usize, DomainError>;

    /// Delete every record of one owner, signing them out everywhere
    async fn delete_all_for_owner(&self, owner_id: i64) -> Result<usize, DomainError>;
}

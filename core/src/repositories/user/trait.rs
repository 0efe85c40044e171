//! User repository trait consumed by the session service.
//!
//! User CRUD is owned elsewhere; the token lifecycle only needs to look a
//! user up by id and flip the active flag when an account is disabled.

use async_trait::async_trait;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User lookups
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with that id
    /// * `Err(DomainError)` - Database or other error occurred
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;

    /// Persist a new user and return it with its generated id
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Set the active flag
    ///
    /// # Returns
    /// * `Ok(true)` - The user existed and was updated
    /// * `Ok(false)` - No user with that id
    async fn set_active(&self, id: i64, is_active: bool) -> Result<bool, DomainError>;
}

//! Session service implementation

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::domain::entities::token::{Principal, RefreshTokenClaims, TokenPair};
use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{RefreshTokenRepository, UserRepository};
use crate::services::token::TokenIssuer;

/// Service tying refresh token records to the tokens that reference them
///
/// Every refresh token is minted only after its record exists, and a
/// rotation creates the replacement record before deleting the old one.
pub struct SessionService<R: RefreshTokenRepository, U: UserRepository> {
    refresh_tokens: Arc<R>,
    users: Arc<U>,
    issuer: Arc<TokenIssuer>,
    store_timeout: Duration,
}

impl<R: RefreshTokenRepository, U: UserRepository> SessionService<R, U> {
    /// Creates a new session service instance
    ///
    /// # Arguments
    ///
    /// * `refresh_tokens` - Refresh token record store
    /// * `users` - User lookup
    /// * `issuer` - Token minting
    pub fn new(refresh_tokens: Arc<R>, users: Arc<U>, issuer: Arc<TokenIssuer>) -> Self {
        let store_timeout = issuer.config().store_timeout;
        Self {
            refresh_tokens,
            users,
            issuer,
            store_timeout,
        }
    }

    /// Starts a session for a user whose credentials were already verified
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - A new record was stored and both tokens minted
    /// * `Err(DomainError)` - `AccountInactive`, or a store/key failure
    pub async fn start_session(&self, user: &User) -> Result<TokenPair, DomainError> {
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        let expires_at = Utc::now() + self.issuer.config().refresh_token_lifetime;
        let record = self
            .bounded(self.refresh_tokens.create(user.id, expires_at))
            .await?;

        info!(user_id = user.id, token_id = record.id, "Session started");
        self.issue_pair(&user.principal(), record.id)
    }

    /// Rotates a verified refresh token
    ///
    /// 1. The owner must still exist and be active.
    /// 2. A new record is created.
    /// 3. The old record is deleted.
    /// 4. A new pair referencing the new record is issued.
    ///
    /// If the old record is already gone (a concurrent rotation or logout
    /// won), the new record is deleted again and `RecordNotFound` is
    /// returned, leaving at most one live record.
    pub async fn rotate(&self, claims: &RefreshTokenClaims) -> Result<TokenPair, DomainError> {
        let (old_id, owner_id) = match (claims.token_id(), claims.owner_id()) {
            (Some(token_id), Some(owner_id)) => (token_id, owner_id),
            _ => return Err(TokenError::TokenMalformed.into()),
        };

        let user = self.active_user(owner_id).await?;

        let expires_at = Utc::now() + self.issuer.config().refresh_token_lifetime;
        let record = self
            .bounded(self.refresh_tokens.create(user.id, expires_at))
            .await?;

        let removed = match self.bounded(self.refresh_tokens.delete(old_id)).await {
            Ok(removed) => removed,
            Err(e) => {
                error!(token_id = old_id, error = %e, "Failed to delete rotated refresh record");
                self.discard(record.id).await;
                return Err(e);
            }
        };

        if !removed {
            debug!(token_id = old_id, "Refresh record already gone during rotation");
            self.discard(record.id).await;
            return Err(TokenError::RecordNotFound.into());
        }

        debug!(user_id = user.id, old_token_id = old_id, new_token_id = record.id, "Refresh token rotated");
        self.issue_pair(&user.principal(), record.id)
    }

    /// Ends the session of a verified refresh token
    ///
    /// Idempotent: returns whether a record was actually removed.
    pub async fn logout(&self, claims: &RefreshTokenClaims) -> Result<bool, DomainError> {
        let token_id = claims.token_id().ok_or(TokenError::TokenMalformed)?;

        let removed = self.bounded(self.refresh_tokens.delete(token_id)).await?;
        if removed {
            info!(token_id, user = %claims.sub, "Session ended");
        } else {
            debug!(token_id, "Logout for an already deleted refresh record");
        }
        Ok(removed)
    }

    /// Deletes every refresh record of a user
    pub async fn revoke_all_sessions(&self, user_id: i64) -> Result<usize, DomainError> {
        let count = self
            .bounded(self.refresh_tokens.delete_all_for_owner(user_id))
            .await?;
        info!(user_id, count, "Revoked all sessions");
        Ok(count)
    }

    /// Marks an account inactive and revokes its sessions
    ///
    /// Access tokens already issued stay valid until they expire.
    pub async fn deactivate_account(&self, user_id: i64) -> Result<usize, DomainError> {
        if !self.bounded(self.users.set_active(user_id, false)).await? {
            return Err(AuthError::UserNotFound.into());
        }
        self.revoke_all_sessions(user_id).await
    }

    /// Looks up the user behind an authenticated principal
    pub async fn current_user(&self, principal: &Principal) -> Result<User, DomainError> {
        let user_id = principal.user_id().ok_or(TokenError::TokenMalformed)?;
        self.bounded(self.users.find_by_id(user_id))
            .await?
            .ok_or_else(|| AuthError::UserNotFound.into())
    }

    async fn active_user(&self, user_id: i64) -> Result<User, DomainError> {
        let user = self
            .bounded(self.users.find_by_id(user_id))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            warn!(user_id, "Refresh attempted for inactive account");
            return Err(AuthError::AccountInactive.into());
        }
        Ok(user)
    }

    fn issue_pair(&self, principal: &Principal, token_id: i64) -> Result<TokenPair, DomainError> {
        let config = self.issuer.config();
        Ok(TokenPair::new(
            self.issuer.issue_access_token(principal)?,
            self.issuer.issue_refresh_token(principal, token_id)?,
            config.access_token_lifetime.num_seconds(),
            config.refresh_token_lifetime.num_seconds(),
        ))
    }

    /// Best-effort removal of a record created by a failed rotation
    async fn discard(&self, token_id: i64) {
        if let Err(e) = self.bounded(self.refresh_tokens.delete(token_id)).await {
            warn!(token_id, error = %e, "Could not discard refresh record; it will expire");
        }
    }

    /// Apply the store timeout to a refresh token or user store call
    async fn bounded<T>(
        &self,
        operation: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        match tokio::time::timeout(self.store_timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(TokenError::store_unavailable("store call timed out").into()),
        }
    }
}

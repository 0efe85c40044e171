//! Tests for session start, rotation and logout

use std::sync::Arc;

use chrono::Utc;

use super::{DeleteFailure, HangingUsers, StuckDelete};
use crate::domain::entities::token::RefreshTokenClaims;
use crate::domain::entities::user::{Role, User};
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{
    InMemoryRefreshTokenRepository, InMemoryUserRepository, RefreshTokenRepository,
    UserRepository,
};
use crate::services::session::SessionService;
use crate::services::token::tests::{BrokenRepository, TEST_PRIVATE_KEY};
use crate::services::token::{KeyProvider, RefreshTokenVerifier, TokenIssuer, TokenServiceConfig};

struct Fixture {
    tokens: Arc<InMemoryRefreshTokenRepository>,
    users: Arc<InMemoryUserRepository>,
    sessions: SessionService<InMemoryRefreshTokenRepository, InMemoryUserRepository>,
    verifier: RefreshTokenVerifier<InMemoryRefreshTokenRepository>,
    user: User,
}

fn config() -> TokenServiceConfig {
    TokenServiceConfig::with_secret("test-refresh-secret")
}

fn issuer() -> Arc<TokenIssuer> {
    let keys = Arc::new(KeyProvider::from_pem(TEST_PRIVATE_KEY).unwrap());
    Arc::new(TokenIssuer::new(keys, config()))
}

async fn fixture() -> Fixture {
    let tokens = Arc::new(InMemoryRefreshTokenRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let user = users
        .create(User::new("a@b.com", "Ada", "Lovelace", Role::Customer))
        .await
        .unwrap();

    Fixture {
        sessions: SessionService::new(tokens.clone(), users.clone(), issuer()),
        verifier: RefreshTokenVerifier::new(tokens.clone(), &config()),
        tokens,
        users,
        user,
    }
}

#[tokio::test]
async fn test_start_session_persists_record_first() {
    let f = fixture().await;

    let pair = f.sessions.start_session(&f.user).await.unwrap();
    let claims = f.verifier.verify(&pair.refresh_token).await.unwrap();

    assert_eq!(f.tokens.ids_for_owner(f.user.id).await, vec![claims.token_id().unwrap()]);
    assert_eq!(pair.access_expires_in, 3600);
    assert_eq!(pair.refresh_expires_in, 7 * 24 * 3600);
    assert_eq!(pair.token_type, "Bearer");
}

#[tokio::test]
async fn test_start_session_rejects_inactive_user() {
    let f = fixture().await;
    let mut user = f.user.clone();
    user.deactivate();

    let err = f.sessions.start_session(&user).await.unwrap_err();
    assert_eq!(err, DomainError::Auth(AuthError::AccountInactive));
    assert!(f.tokens.is_empty().await);
}

#[tokio::test]
async fn test_rotation_replaces_record() {
    let f = fixture().await;
    let pair = f.sessions.start_session(&f.user).await.unwrap();
    let old = f.verifier.verify(&pair.refresh_token).await.unwrap();

    let rotated = f.sessions.rotate(&old).await.unwrap();
    let new = f.verifier.verify(&rotated.refresh_token).await.unwrap();

    assert_ne!(old.jti, new.jti);
    assert_eq!(f.tokens.ids_for_owner(f.user.id).await, vec![new.token_id().unwrap()]);

    let err = f.verifier.verify(&pair.refresh_token).await.unwrap_err();
    assert_eq!(err, DomainError::Token(TokenError::TokenRevoked));
}

#[tokio::test]
async fn test_double_rotation_leaves_one_live_record() {
    let f = fixture().await;
    let pair = f.sessions.start_session(&f.user).await.unwrap();
    let claims = f.verifier.verify(&pair.refresh_token).await.unwrap();

    let first = f.sessions.rotate(&claims).await;
    let second = f.sessions.rotate(&claims).await;

    assert!(first.is_ok());
    assert_eq!(second.unwrap_err(), DomainError::Token(TokenError::RecordNotFound));
    assert_eq!(f.tokens.len().await, 1);
}

#[tokio::test]
async fn test_concurrent_rotations_leave_one_live_record() {
    let f = Arc::new(fixture().await);
    let pair = f.sessions.start_session(&f.user).await.unwrap();
    let claims = f.verifier.verify(&pair.refresh_token).await.unwrap();

    let (a, b) = tokio::join!(f.sessions.rotate(&claims), f.sessions.rotate(&claims));

    assert!(a.is_ok() ^ b.is_ok());
    assert_eq!(f.tokens.len().await, 1);
}

#[tokio::test]
async fn test_rotation_requires_existing_user() {
    let f = fixture().await;
    let pair = f.sessions.start_session(&f.user).await.unwrap();
    let mut claims = f.verifier.verify(&pair.refresh_token).await.unwrap();
    claims.sub = "999".to_string();

    let err = f.sessions.rotate(&claims).await.unwrap_err();
    assert_eq!(err, DomainError::Auth(AuthError::UserNotFound));
    assert_eq!(f.tokens.len().await, 1);
}

#[tokio::test]
async fn test_rotation_requires_active_user() {
    let f = fixture().await;
    let pair = f.sessions.start_session(&f.user).await.unwrap();
    let claims = f.verifier.verify(&pair.refresh_token).await.unwrap();
    f.users.set_active(f.user.id, false).await.unwrap();

    let err = f.sessions.rotate(&claims).await.unwrap_err();
    assert_eq!(err, DomainError::Auth(AuthError::AccountInactive));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let f = fixture().await;
    let pair = f.sessions.start_session(&f.user).await.unwrap();
    let claims = f.verifier.verify(&pair.refresh_token).await.unwrap();

    assert!(f.sessions.logout(&claims).await.unwrap());
    assert!(!f.sessions.logout(&claims).await.unwrap());
    assert!(f.tokens.is_empty().await);

    let err = f.verifier.verify(&pair.refresh_token).await.unwrap_err();
    assert!(err.as_token_error().unwrap().is_revocation());
}

#[tokio::test]
async fn test_deactivate_account_revokes_every_session() {
    let f = fixture().await;
    f.sessions.start_session(&f.user).await.unwrap();
    f.sessions.start_session(&f.user).await.unwrap();

    assert_eq!(f.sessions.deactivate_account(f.user.id).await.unwrap(), 2);
    assert!(f.tokens.is_empty().await);
    assert!(!f.users.find_by_id(f.user.id).await.unwrap().unwrap().is_active);

    let err = f.sessions.deactivate_account(999).await.unwrap_err();
    assert_eq!(err, DomainError::Auth(AuthError::UserNotFound));
}

#[tokio::test]
async fn test_current_user() {
    let f = fixture().await;

    let user = f.sessions.current_user(&f.user.principal()).await.unwrap();
    assert_eq!(user, f.user);
}

#[tokio::test]
async fn test_store_failure_surfaces_as_unavailable() {
    let users = Arc::new(InMemoryUserRepository::new());
    let user = users
        .create(User::new("a@b.com", "Ada", "Lovelace", Role::Customer))
        .await
        .unwrap();
    let sessions = SessionService::new(Arc::new(BrokenRepository::Failing), users, issuer());

    let err = sessions.start_session(&user).await.unwrap_err();
    assert!(err.as_token_error().unwrap().is_unavailable());
}

#[tokio::test(start_paused = true)]
async fn test_hanging_store_times_out() {
    let users = Arc::new(InMemoryUserRepository::new());
    let user = users
        .create(User::new("a@b.com", "Ada", "Lovelace", Role::Customer))
        .await
        .unwrap();
    let sessions = SessionService::new(Arc::new(BrokenRepository::Hanging), users, issuer());

    let err = sessions.start_session(&user).await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::StoreUnavailable { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_hanging_user_store_times_out() {
    let tokens = Arc::new(InMemoryRefreshTokenRepository::new());
    let sessions = SessionService::new(tokens.clone(), Arc::new(HangingUsers), issuer());

    let mut user = User::new("a@b.com", "Ada", "Lovelace", Role::Customer);
    user.id = 1;
    let record = tokens.create(user.id, Utc::now() + chrono::Duration::days(7)).await.unwrap();
    let config = config();
    let claims = RefreshTokenClaims::new(
        &user.principal(),
        record.id,
        &config.issuer,
        config.refresh_token_lifetime,
    );

    let err = sessions.rotate(&claims).await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::StoreUnavailable { .. })));
    assert_eq!(tokens.ids_for_owner(user.id).await, vec![record.id]);

    let err = sessions.current_user(&user.principal()).await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::StoreUnavailable { .. })));

    let err = sessions.deactivate_account(user.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::StoreUnavailable { .. })));
    assert_eq!(tokens.len().await, 1);
}

async fn rotate_with_stuck_delete(failure: DeleteFailure) {
    let users = Arc::new(InMemoryUserRepository::new());
    let user = users
        .create(User::new("a@b.com", "Ada", "Lovelace", Role::Customer))
        .await
        .unwrap();

    let inner = InMemoryRefreshTokenRepository::new();
    let old = inner.create(user.id, Utc::now() + chrono::Duration::days(7)).await.unwrap();
    let tokens = Arc::new(StuckDelete {
        inner,
        pinned: old.id,
        failure,
    });
    let sessions = SessionService::new(tokens.clone(), users, issuer());

    let config = config();
    let claims = RefreshTokenClaims::new(
        &user.principal(),
        old.id,
        &config.issuer,
        config.refresh_token_lifetime,
    );

    let err = sessions.rotate(&claims).await.unwrap_err();
    assert!(matches!(err, DomainError::Token(TokenError::StoreUnavailable { .. })));

    // The old record survives and the replacement is discarded
    assert!(tokens.exists(old.id, user.id).await.unwrap());
    assert_eq!(tokens.inner.ids_for_owner(user.id).await, vec![old.id]);
}

#[tokio::test]
async fn test_failed_delete_keeps_old_record() {
    rotate_with_stuck_delete(DeleteFailure::Error).await;
}

#[tokio::test(start_paused = true)]
async fn test_hanging_delete_keeps_old_record() {
    rotate_with_stuck_delete(DeleteFailure::Hang).await;
}

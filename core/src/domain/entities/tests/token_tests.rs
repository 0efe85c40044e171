use chrono::{Duration, Utc};

use crate::domain::entities::token::*;
use crate::domain::entities::user::Role;

fn principal() -> Principal {
    Principal {
        sub: "1".to_string(),
        email: "a@b.com".to_string(),
        role: Role::Customer,
    }
}

#[test]
fn test_access_claims_round_trip_principal() {
    let claims = AccessTokenClaims::new(&principal(), JWT_ISSUER, Duration::seconds(ACCESS_TOKEN_EXPIRY_SECONDS));

    assert_eq!(claims.principal(), principal());
    assert_eq!(claims.iss, "auth-service");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn test_refresh_claims_embed_record_id() {
    let claims = RefreshTokenClaims::new(&principal(), 5, JWT_ISSUER, Duration::days(7));

    assert_eq!(claims.jti, "5");
    assert_eq!(claims.token_id(), Some(5));
    assert_eq!(claims.owner_id(), Some(1));
}

#[test]
fn test_refresh_claims_reject_non_numeric_ids() {
    let mut claims = RefreshTokenClaims::new(&principal(), 5, JWT_ISSUER, Duration::days(7));
    claims.jti = "abc".to_string();
    claims.sub = "someone".to_string();

    assert_eq!(claims.token_id(), None);
    assert_eq!(claims.owner_id(), None);
}

#[test]
fn test_role_serializes_lowercase() {
    let claims = AccessTokenClaims::new(&principal(), JWT_ISSUER, Duration::hours(1));
    let json = serde_json::to_value(&claims).unwrap();
    assert_eq!(json["role"], "customer");
    assert_eq!(json["sub"], "1");
}

#[test]
fn test_record_expiry_and_ownership() {
    let now = Utc::now();
    let record = RefreshTokenRecord {
        id: 5,
        owner_id: 1,
        expires_at: now - Duration::seconds(1),
        created_at: now,
        updated_at: now,
    };

    assert!(record.is_expired());
    assert!(record.is_owned_by(1));
    assert!(!record.is_owned_by(2));
}

#[test]
fn test_token_pair_is_bearer() {
    let pair = TokenPair::new("a".into(), "r".into(), 3600, 604800);
    assert_eq!(pair.token_type, "Bearer");
}

//! Token entities for access/refresh token authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::user::Role;

/// Access token lifetime (1 hour)
pub const ACCESS_TOKEN_EXPIRY_SECONDS: i64 = 3600;

/// Refresh token lifetime (7 days)
pub const REFRESH_TOKEN_EXPIRY_SECONDS: i64 = 7 * 24 * 3600;

/// Issuer written into and required from every token
pub const JWT_ISSUER: &str = "auth-service";

/// Authenticated identity attached to a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Subject (user id as a decimal string)
    pub sub: String,

    pub email: String,

    pub role: Role,
}

impl Principal {
    /// Numeric user id, if `sub` is one
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Claims of an RS256 access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user id)
    pub sub: String,

    pub email: String,

    pub role: Role,

    /// Issuer
    pub iss: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

impl AccessTokenClaims {
    /// Creates claims for a principal valid for `lifetime` from now
    pub fn new(principal: &Principal, issuer: &str, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: principal.sub.clone(),
            email: principal.email.clone(),
            role: principal.role,
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }

    /// The principal these claims describe
    pub fn principal(&self) -> Principal {
        Principal {
            sub: self.sub.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Claims of an HS256 refresh token
///
/// `jti` is the id of the persisted [`RefreshTokenRecord`]; deleting that
/// record revokes the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl RefreshTokenClaims {
    /// Creates claims referencing the record `token_id`
    pub fn new(principal: &Principal, token_id: i64, issuer: &str, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: principal.sub.clone(),
            email: principal.email.clone(),
            role: principal.role,
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            jti: token_id.to_string(),
        }
    }

    /// Record id this token references
    pub fn token_id(&self) -> Option<i64> {
        self.jti.parse().ok()
    }

    /// Owner id this token was issued to
    pub fn owner_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    pub fn principal(&self) -> Principal {
        Principal {
            sub: self.sub.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Persisted refresh token record
///
/// There is no revoked flag: a token is live exactly as long as its
/// record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Store-generated identifier, embedded as `jti`
    pub id: i64,

    /// User the token was issued to
    pub owner_id: i64,

    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Checks if the record is past its expiry
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Checks if the record belongs to `owner_id`
    pub fn is_owned_by(&self, owner_id: i64) -> bool {
        self.owner_id == owner_id
    }
}

/// Access and refresh token issued together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,

    pub refresh_token: String,

    /// Always "Bearer"
    pub token_type: String,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            access_expires_in,
            refresh_expires_in,
        }
    }
}

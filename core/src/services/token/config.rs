//! Configuration for the token services

use std::time::Duration as StdDuration;

use auth_shared::{DatabaseConfig, JwksConfig, JwtConfig};
use chrono::Duration;

use crate::domain::entities::token::{
    ACCESS_TOKEN_EXPIRY_SECONDS, JWT_ISSUER, REFRESH_TOKEN_EXPIRY_SECONDS,
};

/// Configuration shared by the issuer, the verifiers and the session service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// `iss` claim written and required
    pub issuer: String,
    /// HS256 secret for refresh tokens
    pub refresh_secret: String,
    /// Access token lifetime
    pub access_token_lifetime: Duration,
    /// Refresh token lifetime; also the record expiry and cookie max-age
    pub refresh_token_lifetime: Duration,
    /// Upper bound for each refresh token store call
    pub store_timeout: StdDuration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            issuer: JWT_ISSUER.to_string(),
            refresh_secret: "development-refresh-secret-change-in-production".to_string(),
            access_token_lifetime: Duration::seconds(ACCESS_TOKEN_EXPIRY_SECONDS),
            refresh_token_lifetime: Duration::seconds(REFRESH_TOKEN_EXPIRY_SECONDS),
            store_timeout: StdDuration::from_secs(2),
        }
    }
}

impl TokenServiceConfig {
    /// Build from the loaded application configuration
    pub fn from_app_config(jwt: &JwtConfig, database: &DatabaseConfig) -> Self {
        Self {
            issuer: jwt.issuer.clone(),
            refresh_secret: jwt.refresh_secret.clone(),
            access_token_lifetime: Duration::seconds(jwt.access_token_expiry),
            refresh_token_lifetime: Duration::seconds(jwt.refresh_token_expiry),
            store_timeout: StdDuration::from_millis(database.query_timeout_ms),
        }
    }

    /// Create a configuration with the given refresh secret
    pub fn with_secret(refresh_secret: impl Into<String>) -> Self {
        Self {
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }
}

/// Policy for the remote key-set cache
#[derive(Debug, Clone)]
pub struct JwksCacheConfig {
    /// How long a fetched set is served without refetching
    pub max_age: StdDuration,
    /// Minimum spacing between fetch attempts
    pub min_refresh_interval: StdDuration,
    /// Bound on a single fetch
    pub fetch_timeout: StdDuration,
}

impl Default for JwksCacheConfig {
    fn default() -> Self {
        Self {
            max_age: StdDuration::from_secs(600),
            min_refresh_interval: StdDuration::from_secs(6),
            fetch_timeout: StdDuration::from_secs(5),
        }
    }
}

impl From<&JwksConfig> for JwksCacheConfig {
    fn from(config: &JwksConfig) -> Self {
        Self {
            max_age: StdDuration::from_secs(config.cache_max_age),
            min_refresh_interval: StdDuration::from_secs(config.min_refresh_interval),
            fetch_timeout: StdDuration::from_secs(config.fetch_timeout),
        }
    }
}

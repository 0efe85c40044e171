//! Authentication and token configuration

use serde::{Deserialize, Serialize};

const DEFAULT_REFRESH_SECRET: &str = "development-refresh-secret-change-in-production";

/// JWT signing and lifetime configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// `iss` claim written into and required from every token
    pub issuer: String,

    /// Access token lifetime in seconds
    pub access_token_expiry: i64,

    /// Refresh token lifetime in seconds.
    ///
    /// Drives the token `exp`, the persisted record expiry and the
    /// refresh cookie max-age alike.
    pub refresh_token_expiry: i64,

    /// HS256 secret for refresh tokens
    pub refresh_secret: String,

    /// Path to the PEM-encoded RSA private key
    #[serde(default)]
    pub private_key_path: Option<String>,

    /// Inline PEM-encoded RSA private key (takes precedence over the path)
    #[serde(default)]
    pub private_key_pem: Option<String>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: String::from("auth-service"),
            access_token_expiry: 3600,      // 1 hour
            refresh_token_expiry: 604800,   // 7 days
            refresh_secret: String::from(DEFAULT_REFRESH_SECRET),
            private_key_path: Some(String::from("certs/private.pem")),
            private_key_pem: None,
        }
    }
}

impl JwtConfig {
    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.refresh_secret == DEFAULT_REFRESH_SECRET
    }

    /// Create from environment variables
    ///
    /// `JWT_PRIVATE_KEY` may hold a single-line PEM with literal `\n`
    /// sequences, the form container secrets are usually stored in.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            access_token_expiry: std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.access_token_expiry),
            refresh_token_expiry: std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_token_expiry),
            refresh_secret: std::env::var("JWT_REFRESH_SECRET").unwrap_or(defaults.refresh_secret),
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH")
                .ok()
                .or(defaults.private_key_path),
            private_key_pem: std::env::var("JWT_PRIVATE_KEY")
                .ok()
                .map(|pem| pem.replace("\\n", "\n")),
        }
    }
}

/// Cookie transport configuration for both tokens
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieConfig {
    /// Access token cookie name
    pub access_cookie_name: String,

    /// Refresh token cookie name
    pub refresh_cookie_name: String,

    /// Cookie domain
    #[serde(default)]
    pub domain: Option<String>,

    /// Cookie secure flag (HTTPS only)
    pub secure: bool,

    /// Cookie path
    #[serde(default = "default_cookie_path")]
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_cookie_name: String::from("accessToken"),
            refresh_cookie_name: String::from("refreshToken"),
            domain: None,
            secure: false,  // Set to true in production
            path: default_cookie_path(),
        }
    }
}

impl CookieConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            domain: std::env::var("COOKIE_DOMAIN").ok(),
            secure: std::env::var("COOKIE_SECURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            ..Default::default()
        }
    }
}

/// Remote key-set (JWKS) configuration for access token verification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwksConfig {
    /// JWKS document URL; when unset the local signing key is used
    #[serde(default)]
    pub uri: Option<String>,

    /// How long a fetched key set is considered fresh, in seconds
    pub cache_max_age: u64,

    /// Minimum spacing between two fetch attempts, in seconds
    pub min_refresh_interval: u64,

    /// Timeout for a single fetch, in seconds
    pub fetch_timeout: u64,
}

impl Default for JwksConfig {
    fn default() -> Self {
        Self {
            uri: None,
            cache_max_age: 600,         // 10 minutes
            min_refresh_interval: 6,    // at most 10 fetches per minute
            fetch_timeout: 5,
        }
    }
}

impl JwksConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            uri: std::env::var("JWKS_URI").ok(),
            cache_max_age: std::env::var("JWKS_CACHE_MAX_AGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_max_age),
            min_refresh_interval: std::env::var("JWKS_MIN_REFRESH_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_refresh_interval),
            fetch_timeout: std::env::var("JWKS_FETCH_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fetch_timeout),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Cookie configuration
    #[serde(default)]
    pub cookies: CookieConfig,

    /// Remote key-set configuration
    #[serde(default)]
    pub jwks: JwksConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            cookies: CookieConfig::from_env(),
            jwks: JwksConfig::from_env(),
        }
    }
}

fn default_cookie_path() -> String {
    String::from("/")
}

//! Configuration module with business-specific sub-modules
//!
//! - `auth` - Token lifetimes, signing keys, cookies and remote key sets
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection
//! - `server` - HTTP server configuration

pub mod auth;
pub mod database;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};

pub use auth::{AuthConfig, CookieConfig, JwksConfig, JwtConfig};
pub use database::DatabaseConfig;
pub use environment::Environment;
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let mut auth = AuthConfig::from_env();
        if environment.is_production() {
            auth.cookies.secure = true;
        }

        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth,
        }
    }

    /// Check for settings that must never reach production
    ///
    /// Returns a list of human-readable problems; empty means the
    /// configuration is acceptable for the current environment.
    pub fn production_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.environment.is_production() {
            return issues;
        }
        if self.auth.jwt.is_using_default_secret() {
            issues.push("JWT_REFRESH_SECRET is not set".to_string());
        }
        if !self.auth.cookies.secure {
            issues.push("cookies must be marked secure".to_string());
        }
        issues
    }
}

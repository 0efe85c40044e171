//! HTTP fetcher for a published key-set document

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use reqwest::Client;

use auth_core::errors::{DomainError, TokenError};
use auth_core::services::token::JwksFetcher;
use auth_shared::JwksConfig;

use crate::InfrastructureError;

/// Fetches a key set with a plain GET
///
/// Caching, rate limiting and stale fallback are the caller's concern; see
/// [`JwksCache`](auth_core::services::token::JwksCache).
#[derive(Debug, Clone)]
pub struct HttpJwksFetcher {
    client: Client,
    uri: String,
}

impl HttpJwksFetcher {
    /// Creates a fetcher for `uri` whose requests give up after `timeout`
    pub fn new(uri: impl Into<String>, timeout: Duration) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("auth-service/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            uri: uri.into(),
        })
    }

    /// Builds the fetcher from `JWKS_URI` settings
    pub fn from_config(config: &JwksConfig) -> Result<Self, InfrastructureError> {
        let uri = config
            .uri
            .clone()
            .ok_or_else(|| InfrastructureError::Config("JWKS_URI is not set".to_string()))?;
        Self::new(uri, Duration::from_secs(config.fetch_timeout))
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

#[async_trait]
impl JwksFetcher for HttpJwksFetcher {
    async fn fetch(&self) -> Result<JwkSet, DomainError> {
        tracing::debug!(uri = %self.uri, "Fetching remote key set");

        let response = self
            .client
            .get(&self.uri)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::warn!(uri = %self.uri, error = %e, "Key set request failed");
                DomainError::from(InfrastructureError::Http(e))
            })?;

        response.json::<JwkSet>().await.map_err(|e| {
            TokenError::KeyUnavailable {
                message: format!("Invalid key set document: {}", e),
            }
            .into()
        })
    }
}

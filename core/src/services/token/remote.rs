//! Remote key-set (JWKS) cache for access token verification
//!
//! Fetches go through a [`JwksFetcher`]; the cache guarantees at most one
//! outstanding fetch, spaces fetch attempts by a minimum interval, bounds
//! each fetch with a timeout and falls back to a stale key when a refresh
//! fails.

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::{DomainError, TokenError};

use super::config::JwksCacheConfig;
use super::jwks::select_key;
use super::verifier::VerificationKeySource;

/// Retrieves a key-set document from wherever it is published
#[async_trait]
pub trait JwksFetcher: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, DomainError>;
}

struct CachedKeySet {
    set: JwkSet,
    fetched_at: Instant,
}

/// Caching [`VerificationKeySource`] over a remote key set
pub struct JwksCache<F: JwksFetcher> {
    fetcher: F,
    config: JwksCacheConfig,
    cached: RwLock<Option<CachedKeySet>>,
    /// Held for the whole fetch; the value is the last attempt time
    refresh: Mutex<Option<Instant>>,
}

enum Lookup {
    Fresh(DecodingKey),
    /// Key usable only as a fallback
    Stale(DecodingKey),
    /// Set is fresh but does not contain the key
    Unknown,
    Empty,
}

impl<F: JwksFetcher> JwksCache<F> {
    pub fn new(fetcher: F, config: JwksCacheConfig) -> Self {
        Self {
            fetcher,
            config,
            cached: RwLock::new(None),
            refresh: Mutex::new(None),
        }
    }

    /// Fetch the key set once ahead of the first request
    ///
    /// Failure is not fatal; the next verification retries.
    pub async fn warm_up(&self) {
        let mut last_attempt = self.refresh.lock().await;
        match self.fetch_and_store(&mut last_attempt).await {
            Ok(count) => info!(keys = count, "Remote key set loaded"),
            Err(e) => warn!(error = %e, "Remote key set unavailable at startup"),
        }
    }

    /// Whether a key set has been fetched at least once
    pub async fn is_loaded(&self) -> bool {
        self.cached.read().await.is_some()
    }

    async fn lookup(&self, kid: Option<&str>) -> Result<Lookup, DomainError> {
        let cached = self.cached.read().await;
        let Some(entry) = cached.as_ref() else {
            return Ok(Lookup::Empty);
        };

        let fresh = entry.fetched_at.elapsed() < self.config.max_age;
        match select_key(&entry.set, kid) {
            Some(jwk) => {
                let key = DecodingKey::from_jwk(jwk).map_err(|e| {
                    TokenError::key_unavailable(format!("Unusable key in remote set: {}", e))
                })?;
                Ok(if fresh { Lookup::Fresh(key) } else { Lookup::Stale(key) })
            }
            None if fresh => Ok(Lookup::Unknown),
            None => Ok(Lookup::Empty),
        }
    }

    /// Fetch under the refresh lock and replace the cached set
    ///
    /// The attempt is recorded once the fetch settles; a fetch abandoned by
    /// a dropped caller does not count against the rate limit.
    async fn fetch_and_store(&self, last_attempt: &mut Option<Instant>) -> Result<usize, DomainError> {
        let outcome = tokio::time::timeout(self.config.fetch_timeout, self.fetcher.fetch()).await;
        *last_attempt = Some(Instant::now());

        let set = match outcome {
            Ok(Ok(set)) => set,
            Ok(Err(e)) => return Err(TokenError::key_unavailable(e.to_string()).into()),
            Err(_) => return Err(TokenError::key_unavailable("key set fetch timed out").into()),
        };

        let count = set.keys.len();
        *self.cached.write().await = Some(CachedKeySet {
            set,
            fetched_at: Instant::now(),
        });
        Ok(count)
    }

    fn rate_limited(&self, last_attempt: Option<Instant>) -> bool {
        last_attempt
            .map(|at| at.elapsed() < self.config.min_refresh_interval)
            .unwrap_or(false)
    }
}

#[async_trait]
impl<F: JwksFetcher> VerificationKeySource for JwksCache<F> {
    async fn verification_key(&self, kid: Option<&str>) -> Result<DecodingKey, DomainError> {
        if let Lookup::Fresh(key) = self.lookup(kid).await? {
            return Ok(key);
        }

        // Single flight: waiters queue here and see the winner's result
        let mut last_attempt = self.refresh.lock().await;

        let stale = match self.lookup(kid).await? {
            Lookup::Fresh(key) => return Ok(key),
            Lookup::Stale(key) => Some(key),
            Lookup::Unknown | Lookup::Empty => None,
        };

        if self.rate_limited(*last_attempt) {
            debug!(kid = ?kid, "Key set refresh suppressed by rate limit");
            if let Some(key) = stale {
                return Ok(key);
            }
            return if self.is_loaded().await {
                Err(TokenError::TokenMalformed.into())
            } else {
                Err(TokenError::key_unavailable("key set refresh rate limited").into())
            };
        }

        match self.fetch_and_store(&mut last_attempt).await {
            Ok(count) => {
                debug!(keys = count, "Remote key set refreshed");
                match self.lookup(kid).await? {
                    Lookup::Fresh(key) => Ok(key),
                    _ => Err(TokenError::TokenMalformed.into()),
                }
            }
            Err(e) => match stale {
                Some(key) => {
                    warn!(error = %e, kid = ?kid, "Key set refresh failed, using stale key");
                    Ok(key)
                }
                None => Err(e),
            },
        }
    }
}

//! Periodic removal of expired refresh token records
//!
//! Expired records can no longer back a valid token (the token `exp` and the
//! record expiry are the same instant), so deleting them changes nothing for
//! clients and keeps the table small.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::repositories::RefreshTokenRepository;

/// Sweep schedule
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    pub interval_seconds: u64,
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            enabled: true,
        }
    }
}

/// Deletes refresh token records past their expiry
pub struct TokenCleanupService<R: RefreshTokenRepository + 'static> {
    repository: Arc<R>,
    config: TokenCleanupConfig,
}

impl<R: RefreshTokenRepository> TokenCleanupService<R> {
    pub fn new(repository: Arc<R>, config: TokenCleanupConfig) -> Self {
        Self { repository, config }
    }

    /// Run a single sweep
    ///
    /// Store errors are recorded in the result rather than raised, so a
    /// failing sweep never stops the background loop.
    pub async fn run_cleanup(&self) -> CleanupResult {
        let mut result = CleanupResult::default();
        if !self.config.enabled {
            return result;
        }

        match self.repository.delete_expired().await {
            Ok(0) => debug!("No expired refresh token records"),
            Ok(count) => {
                result.expired_tokens_deleted = count;
                info!(count, "Deleted expired refresh token records");
            }
            Err(e) => {
                error!(error = %e, "Expired refresh token sweep failed");
                result.errors.push(e.to_string());
            }
        }

        result
    }

    /// Spawn the periodic sweep; `None` when cleanup is disabled
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled || self.config.interval_seconds == 0 {
            warn!("Refresh token cleanup is disabled");
            return None;
        }

        let period = Duration::from_secs(self.config.interval_seconds);
        info!(interval_secs = self.config.interval_seconds, "Refresh token cleanup scheduled");

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let result = self.run_cleanup().await;
                if !result.is_success() {
                    warn!(errors = ?result.errors, "Cleanup cycle finished with errors");
                }
            }
        }))
    }
}

/// Outcome of one sweep
#[derive(Debug, Default)]
pub struct CleanupResult {
    pub expired_tokens_deleted: usize,
    pub errors: Vec<String>,
}

impl CleanupResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

//! MySQL pool backing the refresh token and user stores

use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    ConnectOptions, MySqlPool,
};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::log::LevelFilter;

use auth_shared::DatabaseConfig;

use crate::InfrastructureError;

/// Pool handle plus the settings it was opened with
#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
    config: DatabaseConfig,
}

impl DatabasePool {
    /// Open the pool and wait for the first connection
    ///
    /// # Arguments
    /// * `config` - Pool limits, timeouts and the slow-query threshold
    pub async fn connect(config: DatabaseConfig) -> Result<Self, InfrastructureError> {
        tracing::info!(
            max_connections = config.max_connections,
            connect_timeout_secs = config.connect_timeout,
            "Opening database pool"
        );

        let pool = pool_options(&config)
            .connect_with(connect_options(&config)?)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Database pool could not connect");
                InfrastructureError::Database(e)
            })?;

        Ok(Self { pool, config })
    }

    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Threshold above which a round trip counts as degraded
    pub fn slow_threshold(&self) -> Duration {
        Duration::from_millis(self.config.query_timeout_ms)
    }

    /// Round-trip `SELECT 1` and report how long it took
    pub async fn ping(&self) -> Result<Duration, InfrastructureError> {
        let started = Instant::now();
        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        if one != 1 {
            return Err(InfrastructureError::Config(format!(
                "SELECT 1 returned {}",
                one
            )));
        }
        Ok(started.elapsed())
    }

    pub fn statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: self.pool.num_idle(),
            max_connections: self.config.max_connections,
        }
    }

    pub async fn close(&self) {
        tracing::info!(stats = %self.statistics(), "Closing database pool");
        self.pool.close().await;
    }

    /// Apply the embedded migrations under `infra/migrations`
    pub async fn run_migrations(&self) -> Result<(), InfrastructureError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

pub(crate) fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .idle_timeout(Duration::from_secs(config.idle_timeout))
        .max_lifetime(Duration::from_secs(config.max_lifetime))
        .test_before_acquire(true)
}

/// Parse the URL; statements are logged at debug, slow ones at warn
pub(crate) fn connect_options(
    config: &DatabaseConfig,
) -> Result<MySqlConnectOptions, InfrastructureError> {
    let options = MySqlConnectOptions::from_str(&config.url)
        .map_err(|e| InfrastructureError::Config(format!("Invalid database URL: {}", e)))?;

    Ok(options
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(config.query_timeout_ms)))
}

/// Snapshot of pool occupancy
#[derive(Debug, Clone)]
pub struct PoolStatistics {
    pub connections: u32,
    pub idle_connections: usize,
    pub max_connections: u32,
}

impl std::fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} connections ({} idle)",
            self.connections, self.max_connections, self.idle_connections
        )
    }
}

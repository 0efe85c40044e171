use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use auth_api::{create_app, AppState};
use auth_core::services::token::{
    JwksCache, KeyProvider, TokenCleanupConfig, TokenCleanupService, TokenServiceConfig,
    VerificationKeySource,
};
use auth_infra::{DatabasePool, HttpJwksFetcher, MySqlRefreshTokenRepository, MySqlUserRepository};
use auth_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.environment.default_log_filter())),
        )
        .init();

    info!(environment = %config.environment, "Starting auth service");

    let issues = config.production_issues();
    if !issues.is_empty() {
        anyhow::bail!("Refusing to start: {}", issues.join(", "));
    }
    if config.auth.jwt.is_using_default_secret() {
        warn!("Using the default refresh token secret");
    }

    // Signing key; failure here is fatal
    let keys = Arc::new(
        KeyProvider::from_config(&config.auth.jwt).context("Failed to load the signing key")?,
    );

    // Verification key source: remote key set when configured, else the local key
    let key_source: Arc<dyn VerificationKeySource> = match &config.auth.jwks.uri {
        Some(uri) => {
            info!(uri = %uri, "Verifying access tokens against a remote key set");
            let fetcher = HttpJwksFetcher::from_config(&config.auth.jwks)?;
            let cache = JwksCache::new(fetcher, (&config.auth.jwks).into());
            cache.warm_up().await;
            Arc::new(cache)
        }
        None => keys.clone(),
    };

    // Database
    let database = DatabasePool::connect(config.database.clone())
        .await
        .context("Failed to connect to the database")?;
    database.run_migrations().await?;

    let refresh_tokens = Arc::new(MySqlRefreshTokenRepository::new(database.get_pool().clone()));
    let users = Arc::new(MySqlUserRepository::new(database.get_pool().clone()));

    // Expired record sweep
    let cleanup = Arc::new(TokenCleanupService::new(
        refresh_tokens.clone(),
        TokenCleanupConfig {
            interval_seconds: config.server.cleanup_interval,
            enabled: config.server.cleanup_interval > 0,
        },
    ));
    let cleanup_task = cleanup.start_background_task();

    let token_config = TokenServiceConfig::from_app_config(&config.auth.jwt, &config.database);
    let state = web::Data::new(
        AppState::new(
            refresh_tokens,
            users,
            keys,
            key_source,
            token_config,
            config.auth.cookies.clone(),
        )
        .with_database(database.clone()),
    );

    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Server will bind");

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    server.bind(&bind_address)?.run().await?;

    if let Some(task) = cleanup_task {
        task.abort();
    }
    database.close().await;
    info!("Auth service stopped");
    Ok(())
}

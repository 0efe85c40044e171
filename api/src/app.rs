//! Application factory
//!
//! Builds the actix-web application from a prepared [`AppState`].

use std::collections::HashMap;

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use auth_core::domain::entities::user::Role;
use auth_core::repositories::{RefreshTokenRepository, UserRepository};
use auth_shared::{error_codes, ErrorResponse, HealthResponse, HealthStatus};

use crate::middleware::{AccessAuth, RefreshAuth, RequireRole};
use crate::routes::auth::{
    keys::key_set,
    logout::logout,
    refresh::refresh,
    session::{current_user, deactivate_user},
    AppState,
};

/// Create and configure the application with all dependencies
pub fn create_app<R, U>(
    app_state: web::Data<AppState<R, U>>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    R: RefreshTokenRepository + 'static,
    U: UserRepository + 'static,
{
    let access_verifier = app_state.access_verifier.clone();
    let refresh_verifier = app_state.refresh_verifier.clone();
    let access_cookie = app_state.cookies.access_cookie_name.clone();
    let cookies = app_state.cookies.clone();

    App::new()
        .app_data(app_state)
        .wrap(TracingLogger::default())
        // Health check endpoint
        .route("/health", web::get().to(health_check::<R, U>))
        // Public key set
        .route("/.well-known/jwks.json", web::get().to(key_set::<R, U>))
        // API v1 routes
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route(
                        "/refresh",
                        web::post()
                            .to(refresh::<R, U>)
                            .wrap(RefreshAuth::new(refresh_verifier.clone(), &cookies)),
                    )
                    .route(
                        "/logout",
                        web::post()
                            .to(logout::<R, U>)
                            .wrap(RefreshAuth::new(refresh_verifier, &cookies)),
                    )
                    .route(
                        "/self",
                        web::get()
                            .to(current_user::<R, U>)
                            .wrap(AccessAuth::new(access_verifier.clone(), &access_cookie)),
                    )
                    .route(
                        "/users/{id}/deactivate",
                        web::post()
                            .to(deactivate_user::<R, U>)
                            .wrap(RequireRole::new(&[Role::Admin]))
                            .wrap(AccessAuth::new(access_verifier, &access_cookie)),
                    ),
            ),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check<R, U>(state: web::Data<AppState<R, U>>) -> HttpResponse
where
    R: RefreshTokenRepository + 'static,
    U: UserRepository + 'static,
{
    let mut services = HashMap::new();
    services.insert("signing_key".to_string(), HealthStatus::Healthy);

    if let Some(database) = &state.database {
        let status = match database.ping().await {
            Ok(latency) if latency > database.slow_threshold() => {
                tracing::warn!(latency_ms = latency.as_millis() as u64, "Slow database ping");
                HealthStatus::Degraded
            }
            Ok(_) => HealthStatus::Healthy,
            Err(e) => {
                tracing::error!(error = %e, stats = %database.statistics(), "Database ping failed");
                HealthStatus::Unhealthy
            }
        };
        services.insert("database".to_string(), status);
    }

    let health = HealthResponse::from_checks(services, env!("CARGO_PKG_VERSION"));
    match health.status {
        HealthStatus::Unhealthy => HttpResponse::ServiceUnavailable().json(health),
        _ => HttpResponse::Ok().json(health),
    }
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}

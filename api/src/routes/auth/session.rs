use actix_web::{web, HttpResponse};

use auth_core::repositories::{RefreshTokenRepository, UserRepository};
use auth_shared::ApiResponse;

use crate::dto::auth_dto::{DeactivateResponse, UserResponse};
use crate::handlers::error_handler::handle_domain_error;
use crate::middleware::auth::AuthContext;

use super::AppState;

/// Handler for GET /api/v1/auth/self
///
/// Returns the user behind the access token. Requires authentication via
/// Bearer header or access cookie.
pub async fn current_user<R, U>(
    state: web::Data<AppState<R, U>>,
    auth: AuthContext,
) -> HttpResponse
where
    R: RefreshTokenRepository + 'static,
    U: UserRepository + 'static,
{
    match state.sessions.current_user(&auth.principal).await {
        Ok(user) => HttpResponse::Ok().json(ApiResponse::success(UserResponse::from(user))),
        Err(error) => handle_domain_error(&error),
    }
}

/// Handler for POST /api/v1/auth/users/{id}/deactivate
///
/// Admin only. Marks the account inactive and deletes all of its refresh
/// records; its access tokens stay valid until they expire.
pub async fn deactivate_user<R, U>(
    state: web::Data<AppState<R, U>>,
    auth: AuthContext,
    path: web::Path<i64>,
) -> HttpResponse
where
    R: RefreshTokenRepository + 'static,
    U: UserRepository + 'static,
{
    let user_id = path.into_inner();

    match state.sessions.deactivate_account(user_id).await {
        Ok(sessions_revoked) => {
            tracing::info!(user_id, by = %auth.principal.sub, sessions_revoked, "Account deactivated");
            HttpResponse::Ok().json(ApiResponse::success(DeactivateResponse {
                user_id,
                sessions_revoked,
            }))
        }
        Err(error) => handle_domain_error(&error),
    }
}

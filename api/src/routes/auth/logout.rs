use actix_web::{web, HttpResponse};

use auth_core::repositories::{RefreshTokenRepository, UserRepository};
use auth_shared::ApiResponse;

use crate::dto::auth_dto::LogoutResponse;
use crate::handlers::error_handler::handle_domain_error;
use crate::middleware::refresh::RefreshContext;

use super::cookies::cleared_cookies;
use super::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Deletes the record behind the verified refresh cookie and clears both
/// cookies. Nothing is issued. Repeating a logout is harmless.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "data": { "message": "Logged out successfully" }
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing, invalid or already revoked refresh token
/// - 503 Service Unavailable: Session store unavailable
pub async fn logout<R, U>(
    state: web::Data<AppState<R, U>>,
    refresh: RefreshContext,
) -> HttpResponse
where
    R: RefreshTokenRepository + 'static,
    U: UserRepository + 'static,
{
    match state.sessions.logout(&refresh.claims).await {
        Ok(_) => {
            let mut response = HttpResponse::Ok();
            for cookie in cleared_cookies(&state.cookies) {
                response.cookie(cookie);
            }
            response.json(ApiResponse::success(LogoutResponse {
                message: "Logged out successfully".to_string(),
            }))
        }
        Err(error) => handle_domain_error(&error),
    }
}

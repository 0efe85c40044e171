use actix_web::{web, HttpResponse};

use auth_core::repositories::{RefreshTokenRepository, UserRepository};
use auth_shared::ApiResponse;

use crate::dto::auth_dto::SessionResponse;
use crate::handlers::error_handler::handle_domain_error;
use crate::middleware::refresh::RefreshContext;

use super::cookies::{clear_session, token_cookies};
use super::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Rotates the refresh token from the verified cookie: a new record and
/// token pair replace the old ones and both cookies are reset.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "data": {
///         "access_token": "eyJ...",
///         "token_type": "Bearer",
///         "expires_in": 3600,
///         "refresh_expires_in": 604800
///     }
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing, invalid, expired or revoked refresh token
/// - 403 Forbidden: Account is inactive
/// - 503 Service Unavailable: Session store or signing key unavailable
pub async fn refresh<R, U>(
    state: web::Data<AppState<R, U>>,
    refresh: RefreshContext,
) -> HttpResponse
where
    R: RefreshTokenRepository + 'static,
    U: UserRepository + 'static,
{
    match state.sessions.rotate(&refresh.claims).await {
        Ok(pair) => {
            let mut response = HttpResponse::Ok();
            for cookie in token_cookies(&state.cookies, &pair) {
                response.cookie(cookie);
            }
            response.json(ApiResponse::success(SessionResponse::from(&pair)))
        }
        Err(error) => {
            let mut response = handle_domain_error(&error);
            let revoked = error.as_token_error().map_or(false, |e| e.is_revocation());
            if revoked {
                clear_session(&mut response, &state.cookies);
            }
            response
        }
    }
}

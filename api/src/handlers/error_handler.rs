//! Single mapping from domain errors to HTTP responses

use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use auth_core::errors::{AuthError, DomainError, TokenError};
use auth_shared::{error_codes, ErrorResponse};

/// HTTP status for a domain error
///
/// Key and store outages are 503 so clients retry instead of logging out.
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Token(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Token(_) => StatusCode::UNAUTHORIZED,
        DomainError::Auth(AuthError::UserNotFound) => StatusCode::UNAUTHORIZED,
        DomainError::Auth(AuthError::AccountInactive | AuthError::InsufficientPermissions) => {
            StatusCode::FORBIDDEN
        }
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the `{"error", "message", "timestamp"}` response for a domain error
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    let status = status_for(error);

    match error {
        DomainError::Token(TokenError::RecordNotFound) => {
            tracing::debug!(error = %error, "Refresh record already gone");
        }
        _ if status.is_server_error() => tracing::error!(error = %error, "Request failed"),
        _ => tracing::debug!(error = %error, status = status.as_u16(), "Request rejected"),
    }

    let body = match error {
        DomainError::Internal { .. } => {
            ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred")
        }
        DomainError::Token(TokenError::KeyUnavailable { .. }) => ErrorResponse::new(
            error.error_code(),
            "Token verification is temporarily unavailable",
        ),
        DomainError::Token(TokenError::StoreUnavailable { .. }) => {
            ErrorResponse::new(error.error_code(), "Session store is temporarily unavailable")
        }
        _ => ErrorResponse::new(error.error_code(), error.to_string()),
    };

    HttpResponse::build(status).json(body)
}

/// Domain error carried through actix's error path, e.g. out of a middleware
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

impl From<TokenError> for ApiError {
    fn from(error: TokenError) -> Self {
        Self(error.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        Self(error.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(&self.0)
    }

    fn error_response(&self) -> HttpResponse {
        handle_domain_error(&self.0)
    }
}

use actix_web::{http::header, web, HttpResponse};

use auth_core::repositories::{RefreshTokenRepository, UserRepository};

use super::AppState;

/// Handler for GET /.well-known/jwks.json
///
/// Serves the public half of the signing key as a key-set document.
pub async fn key_set<R, U>(state: web::Data<AppState<R, U>>) -> HttpResponse
where
    R: RefreshTokenRepository + 'static,
    U: UserRepository + 'static,
{
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "public, max-age=600"))
        .json(state.keys.public_key_set())
}

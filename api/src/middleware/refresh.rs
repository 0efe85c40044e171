//! Refresh token middleware for the refresh and logout routes.
//!
//! Refresh tokens are read from the refresh cookie only. Verification
//! includes the store lookup; a store failure rejects the request. A
//! revoked token also clears both session cookies.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use auth_core::{
    domain::entities::token::RefreshTokenClaims, errors::TokenError,
    repositories::RefreshTokenRepository, services::token::RefreshTokenVerifier,
};
use auth_shared::CookieConfig;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use crate::handlers::error_handler::{handle_domain_error, ApiError};
use crate::routes::auth::cookies::clear_session;

/// Verified refresh token claims injected into requests
#[derive(Debug, Clone)]
pub struct RefreshContext {
    pub claims: RefreshTokenClaims,
}

/// Refresh token middleware factory
pub struct RefreshAuth<R: RefreshTokenRepository> {
    verifier: Arc<RefreshTokenVerifier<R>>,
    cookies: Rc<CookieConfig>,
}

impl<R: RefreshTokenRepository> RefreshAuth<R> {
    pub fn new(verifier: Arc<RefreshTokenVerifier<R>>, cookies: &CookieConfig) -> Self {
        Self {
            verifier,
            cookies: Rc::new(cookies.clone()),
        }
    }
}

impl<S, B, R> Transform<S, ServiceRequest> for RefreshAuth<R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    R: RefreshTokenRepository + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RefreshAuthMiddleware<S, R>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RefreshAuthMiddleware {
            service: Rc::new(service),
            verifier: Arc::clone(&self.verifier),
            cookies: Rc::clone(&self.cookies),
        }))
    }
}

/// Refresh token middleware service
pub struct RefreshAuthMiddleware<S, R: RefreshTokenRepository> {
    service: Rc<S>,
    verifier: Arc<RefreshTokenVerifier<R>>,
    cookies: Rc<CookieConfig>,
}

impl<S, B, R> Service<ServiceRequest> for RefreshAuthMiddleware<S, R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    R: RefreshTokenRepository + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = Arc::clone(&self.verifier);
        let cookies = Rc::clone(&self.cookies);
        let token = req
            .cookie(&cookies.refresh_cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty());

        Box::pin(async move {
            let verified = match token {
                Some(token) => verifier.verify(&token).await,
                None => Err(TokenError::MissingToken.into()),
            };

            match verified {
                Ok(claims) => {
                    req.extensions_mut().insert(RefreshContext { claims });
                    service.call(req).await.map(|res| res.map_into_left_body())
                }
                Err(error) => {
                    let mut response = handle_domain_error(&error);
                    if error.as_token_error().map_or(false, |e| e.is_revocation()) {
                        clear_session(&mut response, &cookies);
                    }
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

impl FromRequest for RefreshContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<RefreshContext>()
            .cloned()
            .ok_or_else(|| ApiError::from(TokenError::MissingToken));

        ready(result)
    }
}

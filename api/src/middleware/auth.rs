//! Access token authentication middleware for protecting API endpoints.
//!
//! The token is taken from `Authorization: Bearer <token>` or, when the
//! header is absent, from the access token cookie. A header whose token is
//! empty or the literal `undefined` (what browser clients send before they
//! have a token) counts as absent. On success the caller's [`AuthContext`]
//! is injected into the request; on failure the wrapped handler never runs.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use auth_core::{
    domain::entities::{token::Principal, user::Role},
    errors::TokenError,
    services::token::AccessTokenVerifier,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use crate::handlers::error_handler::{handle_domain_error, ApiError};

/// Authenticated caller injected into requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal: Principal,
}

impl AuthContext {
    pub fn user_id(&self) -> Option<i64> {
        self.principal.user_id()
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }
}

/// Access token middleware factory
pub struct AccessAuth {
    verifier: AccessTokenVerifier,
    cookie_name: Rc<str>,
}

impl AccessAuth {
    /// Creates the middleware
    ///
    /// # Arguments
    /// * `verifier` - Verifier bound to the local or remote key source
    /// * `cookie_name` - Cookie consulted when no usable header is present
    pub fn new(verifier: AccessTokenVerifier, cookie_name: &str) -> Self {
        Self {
            verifier,
            cookie_name: Rc::from(cookie_name),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessAuthMiddleware {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
            cookie_name: Rc::clone(&self.cookie_name),
        }))
    }
}

/// Access token middleware service
pub struct AccessAuthMiddleware<S> {
    service: Rc<S>,
    verifier: AccessTokenVerifier,
    cookie_name: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for AccessAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = self.verifier.clone();
        let token = extract_access_token(req.request(), &self.cookie_name);

        Box::pin(async move {
            let verified = match token {
                Some(token) => verifier.verify(&token).await,
                None => Err(TokenError::MissingToken.into()),
            };

            match verified {
                Ok(claims) => {
                    req.extensions_mut().insert(AuthContext {
                        principal: claims.principal(),
                    });
                    service.call(req).await.map(|res| res.map_into_left_body())
                }
                Err(error) => {
                    let response = handle_domain_error(&error);
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Header token first, cookie second
pub fn extract_access_token(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    extract_bearer_token(req).or_else(|| {
        req.cookie(cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Bearer token from the Authorization header, ignoring placeholder values
fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty() && *token != "undefined")
        .map(str::to_string)
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::from(TokenError::MissingToken));

        ready(result)
    }
}

//! Role guard for routes restricted to a set of roles.
//!
//! Must sit inside [`AccessAuth`](super::AccessAuth); a request without an
//! [`AuthContext`] is rejected as unauthenticated.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use auth_core::{
    domain::entities::user::Role,
    errors::{AuthError, DomainError, TokenError},
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use super::auth::AuthContext;
use crate::handlers::error_handler::handle_domain_error;

/// Role guard factory
pub struct RequireRole {
    allowed: Rc<[Role]>,
}

impl RequireRole {
    pub fn new(allowed: &[Role]) -> Self {
        Self {
            allowed: Rc::from(allowed),
        }
    }

    /// Whether `role` passes the guard
    pub fn permits(allowed: &[Role], role: Role) -> bool {
        allowed.contains(&role)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            allowed: Rc::clone(&self.allowed),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    allowed: Rc<[Role]>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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

        let denied: Option<DomainError> = match req.extensions().get::<AuthContext>() {
            None => Some(TokenError::MissingToken.into()),
            Some(auth) if !RequireRole::permits(&self.allowed, auth.role()) => {
                tracing::warn!(
                    user = %auth.principal.sub,
                    role = %auth.role(),
                    path = req.path(),
                    "Role not permitted"
                );
                Some(AuthError::InsufficientPermissions.into())
            }
            Some(_) => None,
        };

        Box::pin(async move {
            match denied {
                None => service.call(req).await.map(|res| res.map_into_left_body()),
                Some(error) => {
                    let response = handle_domain_error(&error);
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

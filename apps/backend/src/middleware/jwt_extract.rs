//! Bearer-token verification.
//!
//! Runs on every route. A valid `Authorization: Bearer` token leaves its
//! `Claims` in the request extensions; a missing or invalid token does not
//! reject the request here. Handlers that need a caller ask for the
//! `CurrentUser` extractor (or a role guard), which answers 401/403.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderValue};
use actix_web::{web, Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::debug;

use crate::auth::jwt::verify_access_token;
use crate::state::AppState;

pub struct JwtExtract;

impl<S, B> Transform<S, ServiceRequest> for JwtExtract
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtExtractMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtExtractMiddleware { service }))
    }
}

pub struct JwtExtractMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for JwtExtractMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = bearer_token(req.headers().get(header::AUTHORIZATION));
        let app_state = req.app_data::<web::Data<AppState>>().cloned();

        if let (Some(token), Some(state)) = (token, app_state) {
            match verify_access_token(&token, &state.security) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                }
                Err(_) => debug!(path = %req.path(), "bearer token ignored"),
            }
        }

        Box::pin(self.service.call(req))
    }
}

/// Token from `Bearer <token>`; the scheme is matched case-insensitively.
fn bearer_token(value: Option<&HeaderValue>) -> Option<String> {
    let raw = value?.to_str().ok()?;
    let (scheme, token) = raw.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

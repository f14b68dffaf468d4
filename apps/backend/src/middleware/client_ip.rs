use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::extractors::client_ip::client_ip_of;

/// Resolves the client address once and stores it as `ClientIp` in the
/// request extensions.
pub struct ClientIpCapture;

impl<S, B> Transform<S, ServiceRequest> for ClientIpCapture
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ClientIpCaptureMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ClientIpCaptureMiddleware { service }))
    }
}

pub struct ClientIpCaptureMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for ClientIpCaptureMiddleware<S>
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
        let ip = client_ip_of(&req);
        req.extensions_mut().insert(ip);
        Box::pin(self.service.call(req))
    }
}

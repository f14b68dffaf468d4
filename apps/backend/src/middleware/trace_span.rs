//! Per-request tracing span.
//!
//! Opens a `request` span with `trace_id`, `method`, `path` and `client_ip`
//! so every event logged inside the handler carries them. Wire it inside
//! `RequestTrace` and `ClientIpCapture`, whose extensions it reads.

use std::future::{ready, Ready};

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{info_span, Instrument};

use crate::extractors::client_ip::ClientIp;
use crate::trace_ctx::TraceId;

#[derive(Clone, Default)]
pub struct TraceSpan;

impl<S, B> Transform<S, ServiceRequest> for TraceSpan
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceSpanMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceSpanMiddleware { service }))
    }
}

pub struct TraceSpanMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceSpanMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let (trace_id, client_ip) = {
            let ext = req.extensions();
            (
                ext.get::<TraceId>()
                    .map(|t| t.0.clone())
                    .unwrap_or_else(|| "missing-trace-id".to_string()),
                ext.get::<ClientIp>().map(|ip| ip.0.clone()).unwrap_or_default(),
            )
        };

        let span = info_span!(
            "request",
            trace_id = %trace_id,
            method = %req.method(),
            path = %req.path(),
            client_ip = %client_ip,
        );

        Box::pin(self.service.call(req).instrument(span))
    }
}

pub mod client_ip;
pub mod cors;
pub mod jwt_extract;
pub mod rate_limit;
pub mod request_trace;
pub mod security_headers;
pub mod structured_logger;

pub use client_ip::ClientIpCapture;
pub use cors::cors_middleware;
pub use jwt_extract::JwtExtract;
pub use request_trace::RequestTrace;
pub use security_headers::SecurityHeaders;
pub use structured_logger::StructuredLogger;

pub mod trace_span;
pub use trace_span::TraceSpan;

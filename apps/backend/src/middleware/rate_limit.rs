//! Rate limits for the credential endpoints.
//!
//! Login, TwoFactorLogin, SendOTP and VerifyOTP allow 5 requests per minute
//! per client IP. The counters live in an in-memory backend shared by all
//! workers; `main` creates it once and passes it to the route config.

use std::time::Duration;

use actix_extensible_rate_limit::backend::memory::InMemoryBackend;
use actix_extensible_rate_limit::backend::SimpleInputFunctionBuilder;

pub const AUTH_WINDOW: Duration = Duration::from_secs(60);
pub const AUTH_MAX_REQUESTS: u64 = 5;

pub fn auth_rate_limit_config() -> SimpleInputFunctionBuilder {
    SimpleInputFunctionBuilder::new(AUTH_WINDOW, AUTH_MAX_REQUESTS).real_ip_key()
}

pub fn auth_rate_limit_backend() -> InMemoryBackend {
    InMemoryBackend::builder().build()
}

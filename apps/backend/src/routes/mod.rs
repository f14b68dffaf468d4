use actix_extensible_rate_limit::backend::memory::InMemoryBackend;
use actix_web::web;

pub mod account;
pub mod errors;
pub mod health;
pub mod lookups;
pub mod products;

/// Every route without rate limiting; used by tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    configure_with_limiter(cfg, None);
}

/// Every route. `main` passes the shared rate-limit backend so the credential
/// endpoints are throttled.
pub fn configure_with_limiter(cfg: &mut web::ServiceConfig, limiter: Option<InMemoryBackend>) {
    cfg.configure(health::configure_routes)
        .configure(errors::configure_routes)
        .configure(products::configure_routes)
        .configure(lookups::configure_routes)
        .configure(|cfg| account::configure_routes(cfg, limiter));
}

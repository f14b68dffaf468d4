pub mod error_pages;
pub mod error_shape;
pub mod healthcheck;
pub mod lookups;
pub mod products;
pub mod rate_limiting;
pub mod security_headers;

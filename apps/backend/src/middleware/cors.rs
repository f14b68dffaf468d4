use std::env;

use actix_cors::Cors;
use actix_web::http::header;

use crate::http::pagination::X_PAGINATION;

/// Origins from `CORS_ALLOWED_ORIGINS` (comma separated). Entries that are
/// empty, `null` or not http(s) are skipped; with nothing valid left the
/// local SPA dev servers are allowed.
pub fn allowed_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(|s| s.trim_end_matches('/').to_string())
        .collect();

    if origins.is_empty() {
        vec![
            "http://localhost:4200".to_string(),
            "http://127.0.0.1:4200".to_string(),
        ]
    } else {
        origins
    }
}

/// Credentials are allowed so the refresh-token cookies travel; the
/// pagination header is exposed to the SPA.
pub fn cors_middleware() -> Cors {
    let raw = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .expose_headers(vec![
            X_PAGINATION,
            header::HeaderName::from_static("x-trace-id"),
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in allowed_origins(&raw) {
        cors = cors.allowed_origin(&origin);
    }

    cors
}

use actix_web::{web, HttpResponse};

use crate::http::ApiResponse;

/// Canonical body for a status code the frontend redirects to.
pub fn error_page(code: u16) -> ApiResponse {
    let (status, message) = match code {
        400 => (400, "BadRequest"),
        401 => (401, "Unauthorized"),
        403 => (403, "Forbidden"),
        404 => (404, "NotFound"),
        500 => (500, "InternalServerError"),
        _ => (500, "UnknownError"),
    };
    ApiResponse::with_message(status, message)
}

async fn error_by_code(code: web::Path<u16>) -> HttpResponse {
    error_page(code.into_inner()).into_http()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/errors/{code}", web::get().to(error_by_code));
}

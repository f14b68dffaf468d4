use actix_web::http::StatusCode;
use actix_web::{test, web, HttpResponse};
use backend_test_support::api_response::{assert_api_error, assert_trace_header};
use product_backend::errors::MessageKey;
use product_backend::test_support::app_builder::create_test_app_builder;
use product_backend::AppError;

use crate::common::state_without_db;

async fn bad_request() -> Result<HttpResponse, AppError> {
    Err(MessageKey::InvalidEmailOrPassword.into())
}

async fn forbidden() -> Result<HttpResponse, AppError> {
    Err(AppError::forbidden())
}

async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::not_found())
}

async fn conflict() -> Result<HttpResponse, AppError> {
    Err(AppError::conflict("ItemIsReferenced"))
}

async fn internal() -> Result<HttpResponse, AppError> {
    Err(AppError::internal("connection string leaked here"))
}

#[actix_web::test]
async fn every_error_is_an_api_response_with_trace_header() {
    let state = state_without_db().await;
    let app = create_test_app_builder(state)
        .with_routes(|cfg| {
            cfg.route("/_test/bad_request", web::get().to(bad_request))
                .route("/_test/forbidden", web::get().to(forbidden))
                .route("/_test/not_found", web::get().to(not_found))
                .route("/_test/conflict", web::get().to(conflict))
                .route("/_test/internal", web::get().to(internal));
        })
        .build()
        .await;

    let cases = [
        ("/_test/bad_request", StatusCode::BAD_REQUEST, Some("InvalidEmailOrPassword")),
        ("/_test/forbidden", StatusCode::FORBIDDEN, Some("Forbidden")),
        (
            "/_test/not_found",
            StatusCode::NOT_FOUND,
            Some("TheRequestedResourceCouldNotBeFound"),
        ),
        ("/_test/conflict", StatusCode::CONFLICT, Some("ItemIsReferenced")),
        ("/_test/internal", StatusCode::INTERNAL_SERVER_ERROR, None),
    ];

    for (uri, status, message) in cases {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_api_error(resp, status, message).await;
    }
}

#[actix_web::test]
async fn internal_errors_hide_their_detail() {
    let state = state_without_db().await;
    let app = create_test_app_builder(state)
        .with_routes(|cfg| {
            cfg.route("/_test/internal", web::get().to(internal));
        })
        .build()
        .await;

    let req = test::TestRequest::get().uri("/_test/internal").to_request();
    let resp = test::call_service(&app, req).await;
    let body = assert_api_error(resp, StatusCode::INTERNAL_SERVER_ERROR, None).await;

    let message = body.message.unwrap_or_default();
    assert!(message.starts_with("Error Code: "), "{message}");
    assert!(!message.contains("connection string"), "{message}");
    assert!(body.details.is_none());
}

#[actix_web::test]
async fn inbound_trace_id_is_echoed() {
    let state = state_without_db().await;
    let app = create_test_app_builder(state)
        .with_routes(|cfg| {
            cfg.route("/_test/not_found", web::get().to(not_found));
        })
        .build()
        .await;

    let inbound = "5f0c7a52-3c51-4c59-9a3e-0d2f4c9b7f10";
    let req = test::TestRequest::get()
        .uri("/_test/not_found")
        .insert_header(("x-trace-id", inbound))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(assert_trace_header(resp.headers()), inbound);

    let req = test::TestRequest::get()
        .uri("/_test/not_found")
        .insert_header(("x-trace-id", "not a uuid"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_ne!(assert_trace_header(resp.headers()), "not a uuid");
}

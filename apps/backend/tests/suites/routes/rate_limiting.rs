// The credential endpoints allow five requests per minute per client IP.

use std::net::SocketAddr;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use product_backend::middleware::rate_limit::{auth_rate_limit_backend, AUTH_MAX_REQUESTS};
use product_backend::middleware::{ClientIpCapture, RequestTrace, StructuredLogger};
use product_backend::routes;
use serde_json::json;

use crate::common::state_without_db;

fn peer(ip: &str) -> SocketAddr {
    format!("{ip}:40000").parse().expect("socket address")
}

#[actix_web::test]
async fn sixth_login_in_a_minute_is_rejected() {
    let state = state_without_db().await;
    let backend = auth_rate_limit_backend();
    let app = test::init_service(
        App::new()
            .wrap(ClientIpCapture)
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(web::Data::new(state))
            .configure(move |cfg| routes::configure_with_limiter(cfg, Some(backend))),
    )
    .await;

    let body = json!({"email": "a@example.com", "password": "Secret1!"});
    for i in 0..AUTH_MAX_REQUESTS {
        let req = test::TestRequest::post()
            .uri("/Account/Login")
            .peer_addr(peer("10.1.1.1"))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        // Without a database the handler answers 503, but the request still counts
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE, "request {}", i + 1);
        assert!(resp.headers().contains_key("x-ratelimit-remaining"));
    }

    let req = test::TestRequest::post()
        .uri("/Account/Login")
        .peer_addr(peer("10.1.1.1"))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    // Another client has its own budget
    let req = test::TestRequest::post()
        .uri("/Account/Login")
        .peer_addr(peer("10.2.2.2"))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn other_account_routes_are_not_limited() {
    let state = state_without_db().await;
    let backend = auth_rate_limit_backend();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(move |cfg| routes::configure_with_limiter(cfg, Some(backend))),
    )
    .await;

    for _ in 0..(AUTH_MAX_REQUESTS + 2) {
        let req = test::TestRequest::post()
            .uri("/Account/ForgotPassword")
            .peer_addr(peer("10.3.3.3"))
            .set_json(json!({"email": "a@example.com"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_ne!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}

use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::api_response::assert_api_error;
use backend_test_support::unique_helpers::unique_email;
use product_backend::entities::{login_logs, users};
use product_backend::test_support::create_test_app;
use product_backend::test_support::fixtures::{
    refresh_token_model, user_with_password, FIXED_NOW,
};
use product_backend::verify_access_token;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use serde_json::json;
use time::Duration;

use crate::common::state_with;

const PASSWORD: &str = "Secret1!";

fn role_row(role: &str) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("role", Value::from(role.to_string()))])
}

fn login_log() -> login_logs::Model {
    login_logs::Model {
        id: 1,
        user_id: "u1".into(),
        role: "Admin".into(),
        login_date: FIXED_NOW,
        ip_address: "203.0.113.9".into(),
        email: "a@example.com".into(),
        name: "Admin".into(),
    }
}

#[actix_web::test]
async fn successful_login_sets_the_dashboard_cookie() {
    let expires = time::OffsetDateTime::now_utc() + Duration::days(10);
    let mut token = refresh_token_model(1, "u1", "refresh-abc", FIXED_NOW);
    token.expires_on = expires;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_with_password("u1", "a@example.com", PASSWORD)]])
        .append_query_results([vec![role_row("Admin")]])
        .append_query_results([vec![token]])
        .append_query_results([vec![login_log()]])
        .into_connection();
    let state = state_with(db).await;
    let security = state.security.clone();
    let app = create_test_app(state).await;

    let req = test::TestRequest::post()
        .uri("/Account/Login")
        .insert_header(("X-Forwarded-For", "203.0.113.9, 10.0.0.1"))
        .set_json(json!({"email": "a@example.com", "password": PASSWORD}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "DashboardRefreshToken")
        .expect("refresh cookie");
    assert_eq!(cookie.value(), "refresh-abc");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["userId"], "u1");
    assert_eq!(body["loginLog"]["ip"], "203.0.113.9");
    assert!(body.get("refreshToken").is_none(), "refresh token only travels in the cookie");

    let claims = verify_access_token(body["token"].as_str().unwrap(), &security).unwrap();
    assert_eq!(claims.user_id, "u1");
    assert_eq!(claims.role, vec!["Admin".to_string()]);
}

#[actix_web::test]
async fn unknown_email_gets_the_generic_message() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<users::Model>::new()])
        .into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::post()
        .uri("/Account/Login")
        .set_json(json!({"email": unique_email("nobody"), "password": PASSWORD}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(resp, StatusCode::BAD_REQUEST, Some("InvalidEmailOrPassword")).await;
}

#[actix_web::test]
async fn missing_fields_fail_validation() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::post()
        .uri("/Account/Login")
        .set_json(json!({"email": "a@example.com"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(
        resp,
        StatusCode::BAD_REQUEST,
        Some("The Password field is required."),
    )
    .await;
}

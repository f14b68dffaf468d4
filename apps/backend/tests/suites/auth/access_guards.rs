// Token verification and role guards on the account endpoints.

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::api_response::assert_api_error;
use product_backend::test_support::create_test_app;
use product_backend::test_support::fixtures::user_model;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::json;

use crate::common::{bearer, state_with, state_without_db};

#[actix_web::test]
async fn garbage_bearer_is_treated_as_anonymous() {
    let app = create_test_app(state_without_db().await).await;

    let req = test::TestRequest::get()
        .uri("/Account/IsTwoFactorEnabled")
        .insert_header(("Authorization", "Bearer not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(
        resp,
        StatusCode::UNAUTHORIZED,
        Some("TheRequestRequiresAuthentication"),
    )
    .await;
}

#[actix_web::test]
async fn users_cannot_inspect_other_accounts() {
    let app = create_test_app(state_without_db().await).await;

    let req = test::TestRequest::get()
        .uri("/Account/IsTwoFactorEnabled?userId=someone-else")
        .insert_header(("Authorization", bearer("u1", &[])))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(resp, StatusCode::FORBIDDEN, Some("Forbidden")).await;
}

#[actix_web::test]
async fn admins_may_inspect_any_account() {
    let mut target = user_model("u2", "b@example.com");
    target.two_factor_enabled = true;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![target]])
        .into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::get()
        .uri("/Account/IsTwoFactorEnabled?userId=u2")
        .insert_header(("Authorization", bearer("admin", &["Admin"])))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["isTwoFactorEnabled"], true);
}

#[actix_web::test]
async fn blocked_from_cash_defaults_to_the_caller() {
    let mut me = user_model("u1", "a@example.com");
    me.blocked_from_cash = true;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![me]])
        .into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::get()
        .uri("/Account/BlockedFromCash")
        .insert_header(("Authorization", bearer("u1", &[])))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"blockedFromCash": true}));
}

#[actix_web::test]
async fn administration_is_admin_only() {
    let app = create_test_app(state_without_db().await).await;
    let staff = bearer("u1", &["CustomerExperience"]);

    let req = test::TestRequest::post()
        .uri("/Account/block-from-cash")
        .insert_header(("Authorization", staff.clone()))
        .set_json(json!({"userId": "u2", "block": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(resp, StatusCode::FORBIDDEN, Some("Forbidden")).await;

    let req = test::TestRequest::delete()
        .uri("/Account/DeleteUser?id=u2")
        .insert_header(("Authorization", staff))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(resp, StatusCode::FORBIDDEN, Some("Forbidden")).await;
}

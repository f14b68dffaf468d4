use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::api_response::assert_api_error;
use backend_test_support::unique_helpers::unique_str;
use product_backend::entities::refresh_tokens;
use product_backend::errors::MessageKey;
use product_backend::test_support::create_test_app;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::json;

use crate::common::{state_with, state_without_db};

#[actix_web::test]
async fn refresh_without_cookie_is_unauthorized() {
    let app = create_test_app(state_without_db().await).await;

    for uri in ["/Account/refreshToken", "/Account/DashboardRefreshToken"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_api_error(resp, StatusCode::UNAUTHORIZED, Some("InvalidToken")).await;
    }
}

#[actix_web::test]
async fn portal_cookie_does_not_refresh_the_app_session() {
    let app = create_test_app(state_without_db().await).await;

    let req = test::TestRequest::get()
        .uri("/Account/refreshToken")
        .cookie(Cookie::new("DashboardRefreshToken", "abc"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(resp, StatusCode::UNAUTHORIZED, Some("InvalidToken")).await;
}

#[actix_web::test]
async fn revoking_needs_a_known_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<refresh_tokens::Model>::new()])
        .into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::post()
        .uri("/Account/RevokeToken")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(resp, StatusCode::BAD_REQUEST, Some(MessageKey::TokenIsRequired.as_str())).await;

    let req = test::TestRequest::post()
        .uri("/Account/RevokeToken")
        .set_json(json!({"token": unique_str("never-issued")}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(resp, StatusCode::BAD_REQUEST, Some(MessageKey::TokenIsInvalid.as_str())).await;
}

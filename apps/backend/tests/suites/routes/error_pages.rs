use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::api_response::assert_api_response;
use product_backend::test_support::create_test_app;

use crate::common::state_without_db;

#[actix_web::test]
async fn known_codes_map_to_their_status() {
    let app = create_test_app(state_without_db().await).await;

    for (code, status, message) in [
        (400, StatusCode::BAD_REQUEST, "BadRequest"),
        (401, StatusCode::UNAUTHORIZED, "Unauthorized"),
        (403, StatusCode::FORBIDDEN, "Forbidden"),
        (404, StatusCode::NOT_FOUND, "NotFound"),
        (500, StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError"),
    ] {
        let req = test::TestRequest::get()
            .uri(&format!("/errors/{code}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_api_response(resp, status, Some(message)).await;
    }
}

#[actix_web::test]
async fn unknown_code_is_reported_as_server_error() {
    let app = create_test_app(state_without_db().await).await;

    let req = test::TestRequest::get().uri("/errors/418").to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_response(resp, StatusCode::INTERNAL_SERVER_ERROR, Some("UnknownError")).await;
}

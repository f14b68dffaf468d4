use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::api_response::{assert_api_error, assert_api_response};
use product_backend::entities::products;
use product_backend::test_support::create_test_app;
use product_backend::test_support::fixtures::product_model;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use serde_json::json;

use crate::common::{bearer, expired_bearer, state_with, state_without_db};

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::from(n))])
}

#[actix_web::test]
async fn list_returns_items_and_pagination_header() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(3)]])
        .append_query_results([vec![product_model(1, "Lamp", 25), product_model(2, "Desk", 120)]])
        .into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::get()
        .uri("/Products?PageSize=2&PageNumber=1&OrderBy=Name")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let header = resp
        .headers()
        .get("x-pagination")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("pagination header");
    let meta: serde_json::Value = serde_json::from_str(&header).unwrap();
    assert_eq!(meta["TotalCount"], 3);
    assert_eq!(meta["PageSize"], 2);
    assert_eq!(meta["CurrentPage"], 1);
    assert_eq!(meta["TotalPages"], 2);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let items = body.as_array().expect("array body");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Lamp");
    assert_eq!(items[1]["price"], 120.0);
}

#[actix_web::test]
async fn get_by_id_and_missing_product() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![product_model(4, "Chair", 60)]])
        .append_query_results([Vec::<products::Model>::new()])
        .into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::get().uri("/Products/4").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 4);
    assert_eq!(body["description"], "Chair description");

    let req = test::TestRequest::get().uri("/Products/5").to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_response(
        resp,
        StatusCode::NOT_FOUND,
        Some("TheRequestedResourceCouldNotBeFound"),
    )
    .await;
}

#[actix_web::test]
async fn mutations_require_a_valid_token() {
    let app = create_test_app(state_without_db().await).await;
    let body = json!({"name": "Lamp", "description": "Bright", "price": 10});

    let req = test::TestRequest::post()
        .uri("/Products")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(
        resp,
        StatusCode::UNAUTHORIZED,
        Some("TheRequestRequiresAuthentication"),
    )
    .await;

    let req = test::TestRequest::delete()
        .uri("/Products/1")
        .insert_header(("Authorization", expired_bearer("u1")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(resp, StatusCode::UNAUTHORIZED, None).await;
}

#[actix_web::test]
async fn create_validates_the_body() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::post()
        .uri("/Products")
        .insert_header(("Authorization", bearer("u1", &[])))
        .set_json(json!({"name": "", "description": "Bright", "price": 10}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(
        resp,
        StatusCode::BAD_REQUEST,
        Some("The Name field is required."),
    )
    .await;
}

#[actix_web::test]
async fn create_returns_the_new_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![product_model(9, "Lamp", 10)]])
        .into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::post()
        .uri("/Products")
        .insert_header(("Authorization", bearer("u1", &[])))
        .set_json(json!({"name": "Lamp", "description": "Bright", "price": 10}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = assert_api_response(resp, StatusCode::OK, Some("TheRequestWasSuccessful")).await;
    assert_eq!(body.id, 9);
}

#[actix_web::test]
async fn delete_of_missing_product_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::delete()
        .uri("/Products/77")
        .insert_header(("Authorization", bearer("u1", &[])))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_response(resp, StatusCode::NOT_FOUND, None).await;
}

#[actix_web::test]
async fn update_without_name_is_rejected() {
    // Nothing is queued, so a write attempt would surface as a 500
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::put()
        .uri("/Products/1")
        .insert_header(("Authorization", bearer("u1", &[])))
        .set_json(json!({"price": 5}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(
        resp,
        StatusCode::BAD_REQUEST,
        Some("The Name field is required."),
    )
    .await;
}

#[actix_web::test]
async fn page_number_past_the_offset_range_is_a_bad_request() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::get()
        .uri(&format!("/Products?PageNumber={}&PageSize=40", u64::MAX))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = assert_api_error(resp, StatusCode::BAD_REQUEST, None).await;
    assert!(
        body.message.unwrap_or_default().contains("out of range"),
        "PageNumber overflow should be reported"
    );
}

use std::collections::BTreeMap;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::api_response::{assert_api_error, assert_api_response};
use product_backend::adapters::lookups_sql::LookupRow;
use product_backend::entities::audits;
use product_backend::errors::MessageKey;
use product_backend::test_support::create_test_app;
use product_backend::test_support::fixtures::FIXED_NOW;
use product_backend::AppState;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use serde_json::json;

use crate::common::{bearer, state_with};

fn languages() -> Vec<LookupRow> {
    vec![
        LookupRow {
            id: 1,
            name: "English".into(),
            order_index: Some(1),
        },
        LookupRow {
            id: 2,
            name: "Arabic".into(),
            order_index: Some(2),
        },
    ]
}

#[actix_web::test]
async fn rows_are_served_from_cache() {
    // No query results are queued, so any database access would fail
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = state_with(db).await;
    state
        .cache
        .set_cache_response("Languages", Some(&languages()), Duration::from_secs(60));
    let app = create_test_app(state).await;

    let req = test::TestRequest::get()
        .uri("/Lookups?tableName=Languages")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body[0]["name"], "English");
    assert_eq!(body[1]["orderIndex"], 2);
}

#[actix_web::test]
async fn create_requires_staff_role() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::post()
        .uri("/Lookups?tableName=Languages")
        .set_json(json!({"name": "French"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(resp, StatusCode::UNAUTHORIZED, None).await;

    let req = test::TestRequest::post()
        .uri("/Lookups?tableName=Languages")
        .insert_header(("Authorization", bearer("u1", &[])))
        .set_json(json!({"name": "French"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(resp, StatusCode::FORBIDDEN, Some("Forbidden")).await;
}

#[actix_web::test]
async fn delete_is_admin_only() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::delete()
        .uri("/Lookups/Languages/1")
        .insert_header(("Authorization", bearer("u1", &["CustomerExperience"])))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(resp, StatusCode::FORBIDDEN, Some("Forbidden")).await;
}

#[actix_web::test]
async fn staff_edit_is_validated_before_touching_the_database() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::put()
        .uri("/Lookups?tableName=Languages&id=1")
        .insert_header(("Authorization", bearer("u1", &["CustomerExperience"])))
        .set_json(json!({"name": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(
        resp,
        StatusCode::BAD_REQUEST,
        Some("The Name field is required."),
    )
    .await;
}

fn cached_languages(state: &AppState) {
    let ttl = Duration::from_secs(60);
    state
        .cache
        .set_cache_response("Languages", Some(&languages()), ttl);
    state.cache.set_cache_response("Languages_Lookup", Some(&1), ttl);
}

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

#[actix_web::test]
async fn committed_create_reloads_the_cached_rows() {
    let audit = audits::Model {
        id: 1,
        user_id: Some("u1".into()),
        audit_type: "Create".into(),
        table_name: "Lookups".into(),
        date_time: FIXED_NOW,
        old_values: None,
        new_values: None,
        affected_columns: None,
        primary_key: None,
    };
    let reloaded: Vec<BTreeMap<&str, Value>> = ["English", "Arabic", "French"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            BTreeMap::from([
                ("id", Value::from(i as i32 + 1)),
                ("name", Value::from(name.to_string())),
                ("order_index", Value::from(None::<i32>)),
            ])
        })
        .collect();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(1)])
        .append_query_results([vec![audit]])
        .append_query_results([reloaded])
        .into_connection();
    let state = state_with(db).await;
    cached_languages(&state);
    let app = create_test_app(state).await;

    let req = test::TestRequest::post()
        .uri("/Lookups?tableName=Languages")
        .insert_header(("Authorization", bearer("u1", &["CustomerExperience"])))
        .set_json(json!({"name": "French"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_response(resp, StatusCode::OK, None).await;

    // The next read comes from the reloaded cache entry.
    let req = test::TestRequest::get()
        .uri("/Lookups?tableName=Languages")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().map(Vec::len), Some(3));
    assert_eq!(body[2]["name"], "French");
}

#[actix_web::test]
async fn failed_create_keeps_the_cached_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(0)])
        .into_connection();
    let state = state_with(db).await;
    cached_languages(&state);
    let app = create_test_app(state).await;

    let req = test::TestRequest::post()
        .uri("/Lookups?tableName=Languages")
        .insert_header(("Authorization", bearer("u1", &["CustomerExperience"])))
        .set_json(json!({"name": "French"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_api_error(
        resp,
        StatusCode::BAD_REQUEST,
        Some(MessageKey::ErrorCreating.as_str()),
    )
    .await;

    // No queued query results remain, so this is served from cache.
    let req = test::TestRequest::get()
        .uri("/Lookups?tableName=Languages")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

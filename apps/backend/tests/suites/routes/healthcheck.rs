use actix_web::http::StatusCode;
use actix_web::test;
use product_backend::test_support::create_test_app;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
use serde_json::Value;

use crate::common::{state_with, state_without_db};

#[actix_web::test]
async fn reports_missing_database_without_failing() {
    let app = create_test_app(state_without_db().await).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "unavailable");
    assert_eq!(body["migrations"], "unknown");
    assert_eq!(body["appVersion"], env!("CARGO_PKG_VERSION"));
    assert!(body["time"].as_str().is_some_and(|t| t.contains('T')));
}

#[actix_web::test]
async fn failing_probe_is_reported_in_the_body() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection refused".into())])
        .into_connection();
    let app = create_test_app(state_with(db).await).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["db"], "error");
}

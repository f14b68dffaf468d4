// Hardening headers are added to every response, errors included.

use actix_web::test;
use product_backend::middleware::security_headers::SECURITY_HEADERS;
use product_backend::test_support::create_test_app;

use crate::common::state_without_db;

#[actix_web::test]
async fn present_on_success_and_error_responses() {
    let app = create_test_app(state_without_db().await).await;

    for uri in ["/health", "/Products/1", "/errors/404"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        let headers = resp.headers();
        for (name, value) in SECURITY_HEADERS {
            assert_eq!(
                headers.get(&name).and_then(|v| v.to_str().ok()),
                Some(value),
                "{name} on {uri}"
            );
        }
    }
}

//! Assertions for the backend's `{statusCode, message, id}` response bodies.
//!
//! The shape is mirrored locally so these helpers do not depend on backend
//! types.

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::HeaderMap;
use actix_web::http::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponseLike {
    pub status_code: u16,
    pub message: Option<String>,
    pub id: i64,
    #[serde(default)]
    pub details: Option<String>,
}

/// Parse `body`, check the HTTP status and that the body repeats it.
pub fn assert_api_response_from_parts(
    status: StatusCode,
    body: &[u8],
    expected_status: StatusCode,
    expected_message: Option<&str>,
) -> ApiResponseLike {
    assert_eq!(status, expected_status, "unexpected HTTP status");

    let text = String::from_utf8_lossy(body);
    let parsed: ApiResponseLike = serde_json::from_slice(body)
        .unwrap_or_else(|e| panic!("body is not an ApiResponse ({e}): {text}"));

    assert_eq!(
        parsed.status_code,
        expected_status.as_u16(),
        "statusCode in body should match the HTTP status"
    );
    if let Some(expected) = expected_message {
        assert_eq!(parsed.message.as_deref(), Some(expected), "body: {text}");
    }
    parsed
}

/// Error responses always carry a non-empty `x-trace-id` header.
pub fn assert_trace_header(headers: &HeaderMap) -> String {
    let value = headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(!value.is_empty(), "x-trace-id header should be present");
    value
}

pub async fn assert_api_response(
    resp: ServiceResponse<BoxBody>,
    expected_status: StatusCode,
    expected_message: Option<&str>,
) -> ApiResponseLike {
    let status = resp.status();
    let body = actix_web::test::read_body(resp).await;
    assert_api_response_from_parts(status, &body, expected_status, expected_message)
}

/// Like `assert_api_response`, for failures: also requires the trace header.
pub async fn assert_api_error(
    resp: ServiceResponse<BoxBody>,
    expected_status: StatusCode,
    expected_message: Option<&str>,
) -> ApiResponseLike {
    assert_trace_header(resp.headers());
    assert_api_response(resp, expected_status, expected_message).await
}

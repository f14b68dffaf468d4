use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

/// Uniform body for non-data responses: `{statusCode, message, id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub message: Option<String>,
    pub id: i64,
}

impl ApiResponse {
    /// Response with the default message for `status_code`.
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            message: Self::default_message(status_code).map(str::to_string),
            id: 0,
        }
    }

    pub fn with_message(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: Some(message.into()),
            id: 0,
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn default_message(status_code: u16) -> Option<&'static str> {
        match status_code {
            200 => Some("TheRequestWasSuccessful"),
            400 => Some("AbadRequestWasReceivedByTheServer"),
            401 => Some("TheRequestRequiresAuthentication"),
            404 => Some("TheRequestedResourceCouldNotBeFound"),
            500 => Some("AnInternalServerErrorOccurred"),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Render with the HTTP status matching `status_code`.
    pub fn into_http(self) -> HttpResponse {
        HttpResponse::build(self.status()).json(self)
    }
}

/// Error body: an `ApiResponse` plus development diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiException {
    #[serde(flatten)]
    pub response: ApiResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiException {
    pub fn new(status_code: u16, message: Option<String>, details: Option<String>) -> Self {
        let mut response = ApiResponse::new(status_code);
        if message.is_some() {
            response.message = message;
        }
        Self { response, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_messages_by_status() {
        assert_eq!(
            ApiResponse::new(200).message.as_deref(),
            Some("TheRequestWasSuccessful")
        );
        assert_eq!(
            ApiResponse::new(400).message.as_deref(),
            Some("AbadRequestWasReceivedByTheServer")
        );
        assert_eq!(
            ApiResponse::new(401).message.as_deref(),
            Some("TheRequestRequiresAuthentication")
        );
        assert_eq!(
            ApiResponse::new(404).message.as_deref(),
            Some("TheRequestedResourceCouldNotBeFound")
        );
        assert_eq!(
            ApiResponse::new(500).message.as_deref(),
            Some("AnInternalServerErrorOccurred")
        );
        assert_eq!(ApiResponse::new(418).message, None);
    }

    #[test]
    fn serializes_camel_case() {
        let body = serde_json::to_value(ApiResponse::ok().with_id(12)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"statusCode": 200, "message": "TheRequestWasSuccessful", "id": 12})
        );
    }

    #[test]
    fn exception_flattens_and_hides_empty_details() {
        let body = serde_json::to_value(ApiException::new(409, Some("taken".into()), None)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"statusCode": 409, "message": "taken", "id": 0})
        );

        let body =
            serde_json::to_value(ApiException::new(500, None, Some("boom".into()))).unwrap();
        assert_eq!(body["message"], "AnInternalServerErrorOccurred");
        assert_eq!(body["details"], "boom");
    }
}

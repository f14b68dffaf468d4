use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::config::runtime_env;
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind};
use crate::errors::MessageKey;
use crate::http::ApiException;
use crate::infra::db_errors::map_db_err;
use crate::trace_ctx;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },
    #[error("Forbidden")]
    Forbidden,
    #[error("Not found: {}", message.as_deref().unwrap_or("resource"))]
    NotFound { message: Option<String> },
    #[error("Conflict: {message}")]
    Conflict { message: String },
    /// Database failure with a client-safe message already attached
    #[error("Database error: {message}")]
    Database { message: String },
    #[error("Database unavailable: {detail}")]
    DbUnavailable { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// 401 with the default `TheRequestRequiresAuthentication` message.
    pub fn unauthenticated() -> Self {
        Self::unauthorized("TheRequestRequiresAuthentication")
    }

    pub fn forbidden() -> Self {
        Self::Forbidden
    }

    pub fn not_found() -> Self {
        Self::NotFound { message: None }
    }

    pub fn not_found_with(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: Some(message.into()),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn db_unavailable(detail: impl Into<String>) -> Self {
        Self::DbUnavailable {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::DbUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database { .. } | AppError::Config { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message; `None` falls back to the status default.
    fn message(&self) -> Option<String> {
        match self {
            AppError::BadRequest { message }
            | AppError::Unauthorized { message }
            | AppError::Conflict { message }
            | AppError::Database { message } => Some(message.clone()),
            AppError::Forbidden => Some("Forbidden".to_string()),
            AppError::NotFound { message } => message.clone(),
            AppError::DbUnavailable { .. } => Some("ServiceUnavailable".to_string()),
            AppError::Config { .. } | AppError::Internal { .. } => None,
        }
    }

    fn is_opaque(&self) -> bool {
        matches!(self, AppError::Config { .. } | AppError::Internal { .. })
    }

    /// Body for an unexpected failure. Each occurrence gets a fresh id that is
    /// logged and returned so support can correlate reports.
    fn opaque_exception(&self, trace_id: &str) -> ApiException {
        let error_id = Uuid::new_v4();
        let detail = match self {
            AppError::Config { detail } | AppError::Internal { detail } => detail.as_str(),
            _ => "",
        };

        error!(%error_id, %trace_id, detail, "unhandled error");

        if runtime_env().is_dev() {
            ApiException::new(
                500,
                Some(format!("[{error_id}] => {self}")),
                Some(format!("{self:?}")),
            )
        } else {
            ApiException::new(
                500,
                Some(format!("Error Code: {error_id}. Please contact support.")),
                None,
            )
        }
    }
}

impl From<MessageKey> for AppError {
    fn from(key: MessageKey) -> Self {
        AppError::bad_request(key)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(message) => AppError::BadRequest { message },
            DomainError::Conflict(ConflictKind::UniqueViolation, message)
            | DomainError::Conflict(ConflictKind::Referenced, message)
            | DomainError::Conflict(ConflictKind::Other(_), message) => {
                AppError::Conflict { message }
            }
            DomainError::NotFound(_, message) => AppError::NotFound {
                message: Some(message),
            },
            DomainError::Unauthorized(message) => AppError::Unauthorized { message },
            DomainError::Infra(InfraErrorKind::DbUnavailable, detail)
            | DomainError::Infra(InfraErrorKind::Timeout, detail) => {
                AppError::DbUnavailable { detail }
            }
            DomainError::Infra(InfraErrorKind::Other(_), message) => {
                AppError::Database { message }
            }
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e).into()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::internal(format!("json error: {e}"))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let trace_id = trace_ctx::trace_id();

        let body = if self.is_opaque() {
            self.opaque_exception(&trace_id)
        } else {
            ApiException::new(status.as_u16(), self.message(), None)
        };

        HttpResponse::build(status)
            .insert_header(("x-trace-id", trace_id))
            .json(body)
    }
}

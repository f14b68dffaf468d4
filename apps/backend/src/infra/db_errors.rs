//! SeaORM -> DomainError translation.
//!
//! Repos convert `sea_orm::DbErr` here; constraint violations become
//! client-readable messages, everything else is logged and made opaque.

use lazy_regex::regex_captures;
use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::logging::pii::Redacted;
use crate::trace_ctx;

pub const UNKNOWN_DB_ERROR: &str = "An unknown database error occurred. Please contact support.";

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Column named by a unique index such as `ux_users_Email` (last `_` segment).
fn unique_violation_message(error_msg: &str) -> String {
    match regex_captures!(r#"unique constraint "([^"]+)""#, error_msg) {
        Some((_, constraint)) => {
            let column = constraint.rsplit('_').next().unwrap_or("Unknown");
            format!("The value for '{column}' is already in use. Please provide a unique value.")
        }
        None => "A unique constraint violation occurred.".to_string(),
    }
}

/// Table referenced by a failing insert/update, singularized.
fn referenced_table(error_msg: &str) -> String {
    match regex_captures!(r#"is not present in table "([^"]+)""#, error_msg) {
        Some((_, table)) => table.strip_suffix('s').unwrap_or(table).to_string(),
        None => "the relevant fields".to_string(),
    }
}

fn foreign_key_violation(error_msg: &str) -> DomainError {
    if error_msg.contains("update or delete on table") || error_msg.contains("DELETE") {
        return DomainError::conflict(
            ConflictKind::Referenced,
            "This item cannot be deleted because it is referenced by other records.",
        );
    }
    DomainError::validation(format!(
        "The field related to '{}' is required and cannot be empty.",
        referenced_table(error_msg)
    ))
}

/// Translate a `DbErr` into a `DomainError` with sanitized, PII-safe detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::RecordNotFound(what) => {
            return DomainError::not_found(NotFoundKind::Other(what.clone()), "Record not found");
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(%trace_id, raw_error = %Redacted(&error_msg), "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
    {
        warn!(%trace_id, raw_error = %Redacted(&error_msg), "Unique constraint violation");
        return DomainError::conflict(
            ConflictKind::UniqueViolation,
            unique_violation_message(&error_msg),
        );
    }

    if mentions_sqlstate(&error_msg, "23503") || error_msg.contains("violates foreign key constraint")
    {
        warn!(%trace_id, raw_error = %Redacted(&error_msg), "Foreign key constraint violation");
        return foreign_key_violation(&error_msg);
    }

    if mentions_sqlstate(&error_msg, "23514") {
        warn!(%trace_id, raw_error = %Redacted(&error_msg), "Check constraint violation");
        return DomainError::validation("Check constraint violation");
    }

    if error_msg.contains("timeout") || error_msg.contains("pool timed out") {
        warn!(%trace_id, raw_error = %Redacted(&error_msg), "Database timeout or pool issue");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(%trace_id, raw_error = %Redacted(&error_msg), "Unhandled database error");
    DomainError::infra(InfraErrorKind::Other("DbErr".into()), UNKNOWN_DB_ERROR)
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}

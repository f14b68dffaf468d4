//! Login log and audit trail writes.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::activity_sea;
use crate::errors::domain::DomainError;

pub use activity_sea::{AuditCreate, LoginLogCreate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditType {
    Create,
    Update,
    Delete,
}

impl AuditType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

pub async fn record_login<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: LoginLogCreate,
    at: OffsetDateTime,
) -> Result<(), DomainError> {
    activity_sea::insert_login_log(conn, dto, at).await?;
    Ok(())
}

pub async fn record_audit<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: AuditCreate,
    at: OffsetDateTime,
) -> Result<(), DomainError> {
    activity_sea::insert_audit(conn, dto, at).await?;
    Ok(())
}

//! SeaORM adapter for the append-only login log and audit trail.

use sea_orm::{ActiveModelTrait, ConnectionTrait, NotSet, Set};
use time::OffsetDateTime;

use crate::entities::{audits, login_logs};

#[derive(Debug, Clone)]
pub struct LoginLogCreate {
    pub user_id: String,
    pub role: String,
    pub ip_address: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AuditCreate {
    pub user_id: Option<String>,
    pub audit_type: String,
    pub table_name: String,
    pub old_values: Option<String>,
    pub new_values: Option<String>,
    pub affected_columns: Option<String>,
    pub primary_key: Option<String>,
}

pub async fn insert_login_log<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: LoginLogCreate,
    at: OffsetDateTime,
) -> Result<login_logs::Model, sea_orm::DbErr> {
    login_logs::ActiveModel {
        id: NotSet,
        user_id: Set(dto.user_id),
        role: Set(dto.role),
        login_date: Set(at),
        ip_address: Set(dto.ip_address),
        email: Set(dto.email),
        name: Set(dto.name),
    }
    .insert(conn)
    .await
}

pub async fn insert_audit<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: AuditCreate,
    at: OffsetDateTime,
) -> Result<audits::Model, sea_orm::DbErr> {
    audits::ActiveModel {
        id: NotSet,
        user_id: Set(dto.user_id),
        audit_type: Set(dto.audit_type),
        table_name: Set(dto.table_name),
        date_time: Set(at),
        old_values: Set(dto.old_values),
        new_values: Set(dto.new_values),
        affected_columns: Set(dto.affected_columns),
        primary_key: Set(dto.primary_key),
    }
    .insert(conn)
    .await
}

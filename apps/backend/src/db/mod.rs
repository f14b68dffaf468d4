pub mod txn;

use sea_orm::DatabaseConnection;

use crate::error::AppError;
use crate::state::AppState;

/// The canonical way for handlers and services to reach the database.
pub fn require_db(state: &AppState) -> Result<&DatabaseConnection, AppError> {
    state
        .db()
        .ok_or_else(|| AppError::db_unavailable("database is not configured"))
}

use actix_web::{web, HttpResponse};
use migration::get_latest_migration_version;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

use crate::db::require_db;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub app_version: &'static str,
    pub db: &'static str,
    pub migrations: String,
    pub time: String,
}

/// `(db, migrations)` for a reachable database.
async fn probe(db: &DatabaseConnection) -> (&'static str, String) {
    let ping = Statement::from_string(db.get_database_backend(), "SELECT 1 AS health_check");
    if let Err(e) = db.query_one(ping).await {
        warn!(error = %e, "health probe query failed");
        return ("error", "unknown".to_string());
    }
    let migrations = match get_latest_migration_version(db).await {
        Ok(Some(version)) => version,
        Ok(None) => "no_migrations".to_string(),
        Err(_) => "unknown".to_string(),
    };
    ("ok", migrations)
}

/// Always answers 200; database trouble shows up in the body only.
async fn health(app_state: web::Data<AppState>) -> HttpResponse {
    let (db, migrations) = match require_db(&app_state) {
        Ok(conn) => probe(conn).await,
        Err(_) => ("unavailable", "unknown".to_string()),
    };

    let time = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        db,
        migrations,
        time,
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::db::require_db;
use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::errors::MessageKey;
use crate::extractors::{AdminUser, StaffUser, ValidatedJson};
use crate::http::ApiResponse;
use crate::services::lookups::{self, LookupsEdit};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TableQuery {
    #[serde(rename = "tableName", alias = "TableName")]
    pub table_name: String,
}

#[derive(Debug, Deserialize)]
pub struct TableRowQuery {
    #[serde(rename = "tableName", alias = "TableName")]
    pub table_name: String,
    #[serde(alias = "Id")]
    pub id: i32,
}

async fn table_names(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    Ok(HttpResponse::Ok().json(lookups::table_names(db).await?))
}

async fn table_rows(
    app_state: web::Data<AppState>,
    query: web::Query<TableQuery>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let rows = lookups::rows(db, &app_state.cache, &query.table_name).await?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn table_row(
    app_state: web::Data<AppState>,
    path: web::Path<(String, i32)>,
) -> Result<HttpResponse, AppError> {
    let (table, id) = path.into_inner();
    let db = require_db(&app_state)?;
    Ok(HttpResponse::Ok().json(lookups::row(db, &table, id).await?))
}

async fn load_all(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    Ok(HttpResponse::Ok().json(lookups::load_all(db, &app_state.cache).await?))
}

async fn create_row(
    StaffUser(user): StaffUser,
    app_state: web::Data<AppState>,
    query: web::Query<TableQuery>,
    body: ValidatedJson<LookupsEdit>,
) -> Result<HttpResponse, AppError> {
    let table = query.into_inner().table_name;
    let edit = body.into_inner();
    let now = OffsetDateTime::now_utc();

    let written = table.clone();
    with_txn(&app_state, move |txn| {
        Box::pin(async move { lookups::create(txn, &user.user_id, &written, &edit, now).await })
    })
    .await?;
    lookups::refresh_cached(require_db(&app_state)?, &app_state.cache, &table).await;
    Ok(ApiResponse::with_message(200, MessageKey::CreatedSuccessfully).into_http())
}

async fn update_row(
    StaffUser(user): StaffUser,
    app_state: web::Data<AppState>,
    query: web::Query<TableRowQuery>,
    body: ValidatedJson<LookupsEdit>,
) -> Result<HttpResponse, AppError> {
    let TableRowQuery { table_name, id } = query.into_inner();
    let edit = body.into_inner();
    let now = OffsetDateTime::now_utc();

    let written = table_name.clone();
    with_txn(&app_state, move |txn| {
        Box::pin(async move {
            lookups::update(txn, &user.user_id, &written, id, &edit, now).await
        })
    })
    .await?;
    lookups::refresh_cached(require_db(&app_state)?, &app_state.cache, &table_name).await;
    Ok(ApiResponse::with_message(200, MessageKey::ItemUpdated).into_http())
}

async fn delete_row(
    AdminUser(user): AdminUser,
    app_state: web::Data<AppState>,
    path: web::Path<(String, i32)>,
) -> Result<HttpResponse, AppError> {
    let (table, id) = path.into_inner();
    let now = OffsetDateTime::now_utc();

    let written = table.clone();
    with_txn(&app_state, move |txn| {
        Box::pin(async move { lookups::delete(txn, &user.user_id, &written, id, now).await })
    })
    .await?;
    lookups::refresh_cached(require_db(&app_state)?, &app_state.cache, &table).await;
    Ok(ApiResponse::with_message(200, MessageKey::ItemDeleted).into_http())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/Lookups/GetTableNames", web::get().to(table_names))
        .route("/Lookups/LoadAllLookups", web::get().to(load_all))
        .service(
            web::resource("/Lookups")
                .route(web::get().to(table_rows))
                .route(web::post().to(create_row))
                .route(web::put().to(update_row)),
        )
        .service(
            web::resource("/Lookups/{tableName}/{id}")
                .route(web::get().to(table_row))
                .route(web::delete().to(delete_row)),
        );
}

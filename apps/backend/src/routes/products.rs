use actix_web::{web, HttpResponse};

use crate::db::require_db;
use crate::error::AppError;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::http::{ApiResponse, PaginationMetaData, X_PAGINATION};
use crate::repos::crud::ResourceParams;
use crate::services::products::{self, CreateProductDto, UpdateProductDto};
use crate::state::AppState;

async fn list_products(
    app_state: web::Data<AppState>,
    params: web::Query<ResourceParams>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let page = products::list(db, &app_state.cache, &params).await?;

    let mut resp = HttpResponse::Ok();
    if let Some(value) = PaginationMetaData::from_paged(&page).header_value() {
        resp.insert_header((X_PAGINATION, value));
    }
    Ok(resp.json(page.items))
}

async fn get_product(
    app_state: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    Ok(match products::get(db, id.into_inner()).await? {
        Some(product) => HttpResponse::Ok().json(product),
        None => ApiResponse::new(404).into_http(),
    })
}

async fn create_product(
    _user: CurrentUser,
    app_state: web::Data<AppState>,
    body: ValidatedJson<CreateProductDto>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let created = products::create(db, &app_state.cache, body.into_inner(), products::today()).await?;
    Ok(match created {
        Some(id) => ApiResponse::ok().with_id(i64::from(id)).into_http(),
        None => ApiResponse::new(400).into_http(),
    })
}

async fn update_product(
    _user: CurrentUser,
    app_state: web::Data<AppState>,
    id: web::Path<i32>,
    body: ValidatedJson<UpdateProductDto>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let updated = products::update(db, &app_state.cache, id.into_inner(), body.into_inner()).await?;
    Ok(if updated {
        ApiResponse::ok().into_http()
    } else {
        ApiResponse::new(404).into_http()
    })
}

async fn delete_product(
    _user: CurrentUser,
    app_state: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let deleted = products::delete(db, &app_state.cache, id.into_inner()).await?;
    Ok(if deleted {
        ApiResponse::ok().into_http()
    } else {
        ApiResponse::new(404).into_http()
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/Products")
            .route(web::get().to(list_products))
            .route(web::post().to(create_product)),
    )
    .service(
        web::resource("/Products/{id}")
            .route(web::get().to(get_product))
            .route(web::put().to(update_product))
            .route(web::delete().to(delete_product)),
    );
}

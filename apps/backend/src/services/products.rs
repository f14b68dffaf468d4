//! Product catalog.
//!
//! Listing pages are cached per query; any mutation drops every cached page.

use std::time::Duration;

use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::{debug, info};

use super::cache::{generate_cache_key, CacheService};
use crate::error::AppError;
use crate::extractors::validated_json::{required, required_text, Validate};
use crate::repos::crud::{PagedList, ResourceParams};
use crate::repos::products::{self, Product, ProductCreate, ProductUpdate};

pub const PRODUCTS_ENTITY: &str = "Products";
const LIST_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub created_date: Option<Date>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            created_date: p.created_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub created_date: Option<Date>,
}

impl Validate for CreateProductDto {
    fn validate(&self) -> Result<(), String> {
        required_text("Name", &self.name, 100)?;
        required_text("Description", &self.description, 500)?;
        required("Price", self.price.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}

impl Validate for UpdateProductDto {
    fn validate(&self) -> Result<(), String> {
        required_text("Name", &self.name, 100)?;
        required_text("Description", &self.description, 500)?;
        required("Price", self.price.as_ref())
    }
}

fn invalidate_listing(cache: &CacheService) {
    let prefix = format!("{PRODUCTS_ENTITY}_");
    for key in cache.keys().into_iter().filter(|k| k.starts_with(&prefix)) {
        cache.remove_cached_response(&key);
    }
}

pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cache: &CacheService,
    params: &ResourceParams,
) -> Result<PagedList<ProductDto>, AppError> {
    let key = generate_cache_key(PRODUCTS_ENTITY, params);
    if let Some(page) = cache.get_cached::<PagedList<ProductDto>>(&key) {
        debug!(cache_key = %key, "product page served from cache");
        return Ok(page);
    }
    let page = products::list(conn, params).await?.map(ProductDto::from);
    cache.set_cache_response(&key, Some(&page), LIST_CACHE_TTL);
    Ok(page)
}

pub async fn get<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i32,
) -> Result<Option<ProductDto>, AppError> {
    Ok(products::find(conn, id).await?.map(ProductDto::from))
}

/// Returns the new id, `None` when nothing was created.
pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cache: &CacheService,
    dto: CreateProductDto,
    today: Date,
) -> Result<Option<i32>, AppError> {
    let Some(price) = dto.price else {
        return Err(AppError::bad_request("The Price field is required."));
    };
    let id = products::create(
        conn,
        ProductCreate {
            name: dto.name.trim().to_string(),
            description: dto.description.trim().to_string(),
            price,
            created_date: dto.created_date.unwrap_or(today),
        },
    )
    .await?;
    if let Some(id) = id {
        info!(product_id = id, "product created");
        invalidate_listing(cache);
    }
    Ok(id)
}

/// Returns `false` when the product does not exist.
pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cache: &CacheService,
    id: i32,
    dto: UpdateProductDto,
) -> Result<bool, AppError> {
    let Some(price) = dto.price else {
        return Err(AppError::bad_request("The Price field is required."));
    };
    let updated = products::update(
        conn,
        id,
        ProductUpdate {
            name: dto.name.trim().to_string(),
            description: dto.description.trim().to_string(),
            price,
        },
    )
    .await?;
    if updated {
        info!(product_id = id, "product updated");
        invalidate_listing(cache);
    }
    Ok(updated)
}

pub async fn delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cache: &CacheService,
    id: i32,
) -> Result<bool, AppError> {
    let deleted = products::delete(conn, id).await?;
    if deleted {
        info!(product_id = id, "product deleted");
        invalidate_listing(cache);
    }
    Ok(deleted)
}

/// Today's date in UTC, the default `createdDate`.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

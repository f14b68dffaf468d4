//! Product repository built on the generic CRUD functions.

use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, NotSet, Set};
use time::Date;

use super::crud::{self, PagedList, ResourceParams, RoleScope, UpdateMode, Unscoped};
use crate::entities::products;
use crate::errors::domain::DomainError;

pub type Product = products::Model;

/// Columns a client may change on an existing product.
const UPDATABLE: [products::Column; 3] = [
    products::Column::Name,
    products::Column::Description,
    products::Column::Price,
];

#[derive(Debug, Clone, PartialEq)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub created_date: Date,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

/// Products are visible to every caller.
fn scope() -> &'static dyn RoleScope<products::Entity> {
    &Unscoped
}

pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    params: &ResourceParams,
) -> Result<PagedList<Product>, DomainError> {
    crud::get_all::<products::Entity, _>(conn, params, false, scope()).await
}

pub async fn find<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i32,
) -> Result<Option<Product>, DomainError> {
    crud::get_by_id::<products::Entity, _>(conn, id, scope()).await
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ProductCreate,
) -> Result<Option<i32>, DomainError> {
    let active = products::ActiveModel {
        id: NotSet,
        name: Set(dto.name),
        description: Set(dto.description),
        price: Set(dto.price),
        created_date: Set(Some(dto.created_date)),
    };
    crud::create::<products::Entity, _>(conn, active).await
}

/// Returns `false` when the product does not exist.
pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i32,
    dto: ProductUpdate,
) -> Result<bool, DomainError> {
    let incoming = Product {
        id,
        name: dto.name,
        description: dto.description,
        price: dto.price,
        created_date: None,
    };
    crud::update::<products::Entity, _>(conn, id, incoming, UpdateMode::Partial(&UPDATABLE)).await
}

pub async fn delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: i32,
) -> Result<bool, DomainError> {
    crud::delete::<products::Entity, _>(conn, id).await
}

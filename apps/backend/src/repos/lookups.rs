//! Lookup-table repository.

use std::cmp::Ordering;

use sea_orm::ConnectionTrait;

use crate::adapters::lookups_sql;
use crate::errors::domain::DomainError;
use crate::errors::MessageKey;

pub use lookups_sql::LookupRow;

/// Tables hidden from the table-name listing.
pub const HIDDEN_TABLES: [&str; 6] = [
    "Ages",
    "Bmi",
    "OrderStates",
    "PaymentsTypes",
    "InvoiceTypes",
    "RefundStates",
];

/// Only rows with an `order_index` are served from this table.
const ORDERED_ONLY_TABLE: &str = "PaymentsTypes";

fn checked(table: &str) -> Result<&str, DomainError> {
    if lookups_sql::is_valid_table_name(table) {
        Ok(table)
    } else {
        Err(DomainError::validation(MessageKey::InvalidTableName))
    }
}

/// Rows with an `order_index` first (ascending), then the rest, ties by id.
pub fn sort_rows(rows: &mut [LookupRow]) {
    rows.sort_by(|a, b| match (a.order_index, b.order_index) {
        (Some(x), Some(y)) => x.cmp(&y).then(a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });
}

pub async fn table_names<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<String>, DomainError> {
    let names = lookups_sql::table_names(conn).await?;
    Ok(names
        .into_iter()
        .filter(|name| !HIDDEN_TABLES.contains(&name.as_str()))
        .collect())
}

pub async fn all_rows<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &str,
) -> Result<Vec<LookupRow>, DomainError> {
    let table = checked(table)?;
    let mut rows = lookups_sql::all_rows(conn, table, table == ORDERED_ONLY_TABLE).await?;
    sort_rows(&mut rows);
    Ok(rows)
}

pub async fn row_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &str,
    id: i32,
) -> Result<Option<LookupRow>, DomainError> {
    Ok(lookups_sql::row_by_id(conn, checked(table)?, id).await?)
}

/// Returns whether exactly one row was written.
pub async fn insert_row<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &str,
    name: &str,
    order_index: Option<i32>,
) -> Result<bool, DomainError> {
    Ok(lookups_sql::insert_row(conn, checked(table)?, name, order_index).await? == 1)
}

pub async fn update_row<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &str,
    id: i32,
    name: &str,
    order_index: Option<i32>,
) -> Result<bool, DomainError> {
    Ok(lookups_sql::update_row(conn, checked(table)?, id, name, order_index).await? == 1)
}

pub async fn delete_row<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &str,
    id: i32,
) -> Result<bool, DomainError> {
    Ok(lookups_sql::delete_row(conn, checked(table)?, id).await? == 1)
}

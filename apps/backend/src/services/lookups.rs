//! Lookup tables: cached reads and audited mutations.
//!
//! Each table's rows live in the cache under the table name for a day. Once
//! a mutation commits, [`refresh_cached`] drops that entry (and the
//! `{table}_Lookup` variant) and caches a fresh read.

use std::collections::BTreeMap;
use std::time::Duration;

use sea_orm::ConnectionTrait;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::cache::CacheService;
use crate::error::AppError;
use crate::errors::MessageKey;
use crate::extractors::validated_json::{required_text, Validate};
use crate::repos::activity::{self, AuditCreate, AuditType};
use crate::repos::lookups::{self, LookupRow};

const ROWS_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const AUDIT_TABLE: &str = "Lookups";

/// Tables left out of the bulk load.
pub const NOT_PRELOADED: [&str; 3] = ["Categories", "Certificates", "Classifications"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupsEdit {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub order_index: Option<i32>,
}

impl Validate for LookupsEdit {
    fn validate(&self) -> Result<(), String> {
        required_text("Name", &self.name, 100)
    }
}

fn lookup_key(table: &str) -> String {
    format!("{table}_Lookup")
}

pub async fn table_names<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<String>, AppError> {
    Ok(lookups::table_names(conn).await?)
}

pub async fn rows<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cache: &CacheService,
    table: &str,
) -> Result<Vec<LookupRow>, AppError> {
    if let Some(rows) = cache.get_cached::<Vec<LookupRow>>(table) {
        debug!(table, "lookup rows served from cache");
        return Ok(rows);
    }
    let rows = lookups::all_rows(conn, table).await?;
    cache.set_cache_response(table, Some(&rows), ROWS_CACHE_TTL);
    Ok(rows)
}

pub async fn row<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &str,
    id: i32,
) -> Result<LookupRow, AppError> {
    lookups::row_by_id(conn, table, id)
        .await?
        .ok_or_else(|| AppError::not_found_with(MessageKey::ItemNotFound))
}

/// Rows of every listed table, keyed by table name.
pub async fn load_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cache: &CacheService,
) -> Result<BTreeMap<String, Vec<LookupRow>>, AppError> {
    let mut all = BTreeMap::new();
    for table in lookups::table_names(conn).await? {
        if NOT_PRELOADED.contains(&table.as_str()) {
            continue;
        }
        let rows = rows(conn, cache, &table).await?;
        all.insert(table, rows);
    }
    Ok(all)
}

/// Call after the mutation commits. A failed reload leaves the entry empty
/// so the next read goes to the database.
pub async fn refresh_cached<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cache: &CacheService,
    table: &str,
) {
    cache.remove_cached_response(table);
    cache.remove_cached_response(&lookup_key(table));
    match lookups::all_rows(conn, table).await {
        Ok(rows) => cache.set_cache_response(table, Some(&rows), ROWS_CACHE_TTL),
        Err(e) => warn!(table, error = %e, "lookup cache reload failed"),
    }
}

fn edit_values(edit: &LookupsEdit) -> String {
    json!({ "Name": edit.name, "OrderIndex": edit.order_index }).to_string()
}

fn id_key(id: i32) -> String {
    json!({ "Id": id }).to_string()
}

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    table: &str,
    edit: &LookupsEdit,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    if !lookups::insert_row(conn, table, edit.name.trim(), edit.order_index).await? {
        return Err(MessageKey::ErrorCreating.into());
    }
    activity::record_audit(
        conn,
        AuditCreate {
            user_id: Some(user_id.to_string()),
            audit_type: AuditType::Create.as_str().to_string(),
            table_name: AUDIT_TABLE.to_string(),
            old_values: None,
            new_values: Some(edit_values(edit)),
            affected_columns: None,
            primary_key: None,
        },
        now,
    )
    .await?;
    info!(table, user_id, "lookup row created");
    Ok(())
}

pub async fn update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    table: &str,
    id: i32,
    edit: &LookupsEdit,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    let before = lookups::row_by_id(conn, table, id).await?;
    if !lookups::update_row(conn, table, id, edit.name.trim(), edit.order_index).await? {
        return Err(MessageKey::ErrorUpdating.into());
    }
    let old_values = before
        .map(|row| json!({ "Name": row.name, "OrderIndex": row.order_index }).to_string());
    activity::record_audit(
        conn,
        AuditCreate {
            user_id: Some(user_id.to_string()),
            audit_type: AuditType::Update.as_str().to_string(),
            table_name: AUDIT_TABLE.to_string(),
            old_values,
            new_values: Some(edit_values(edit)),
            affected_columns: Some(json!(["Name", "OrderIndex"]).to_string()),
            primary_key: Some(id_key(id)),
        },
        now,
    )
    .await?;
    info!(table, id, user_id, "lookup row updated");
    Ok(())
}

pub async fn delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    table: &str,
    id: i32,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    if !lookups::delete_row(conn, table, id).await? {
        return Err(MessageKey::ErrorDeleting.into());
    }
    activity::record_audit(
        conn,
        AuditCreate {
            user_id: Some(user_id.to_string()),
            audit_type: AuditType::Delete.as_str().to_string(),
            table_name: AUDIT_TABLE.to_string(),
            old_values: None,
            new_values: None,
            affected_columns: None,
            primary_key: Some(id_key(id)),
        },
        now,
    )
    .await?;
    info!(table, id, user_id, "lookup row deleted");
    Ok(())
}

//! Raw-SQL adapter for the `lookups` schema.
//!
//! Lookup tables share one shape (`id`, `name`, `order_index`) but are not
//! modelled as entities; the table name is spliced into the statement, so
//! callers must validate it with [`is_valid_table_name`] first.

use lazy_regex::regex_is_match;
use sea_orm::{ConnectionTrait, FromQueryResult, Statement, Value};
use serde::{Deserialize, Serialize};

pub const LOOKUPS_SCHEMA: &str = "lookups";

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRow {
    pub id: i32,
    pub name: String,
    pub order_index: Option<i32>,
}

#[derive(Debug, FromQueryResult)]
struct TableNameRow {
    table_name: String,
}

pub fn is_valid_table_name(table: &str) -> bool {
    regex_is_match!(r"^[a-zA-Z0-9]+$", table)
}

fn qualified(table: &str) -> String {
    format!(r#""{LOOKUPS_SCHEMA}"."{table}""#)
}

fn statement<C: ConnectionTrait>(
    conn: &C,
    sql: String,
    values: impl IntoIterator<Item = Value>,
) -> Statement {
    Statement::from_sql_and_values(conn.get_database_backend(), sql, values)
}

pub async fn table_names<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<String>, sea_orm::DbErr> {
    let stmt = statement(
        conn,
        "SELECT table_name::text AS table_name FROM information_schema.tables \
         WHERE table_schema = $1 ORDER BY table_name"
            .to_string(),
        [LOOKUPS_SCHEMA.into()],
    );
    let rows = TableNameRow::find_by_statement(stmt).all(conn).await?;
    Ok(rows.into_iter().map(|r| r.table_name).collect())
}

/// Rows of `table`, optionally only those with an `order_index`.
pub async fn all_rows<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &str,
    ordered_only: bool,
) -> Result<Vec<LookupRow>, sea_orm::DbErr> {
    let filter = if ordered_only {
        " WHERE order_index IS NOT NULL"
    } else {
        ""
    };
    let sql = format!(
        "SELECT id, name, order_index FROM {}{filter}",
        qualified(table)
    );
    LookupRow::find_by_statement(statement(conn, sql, []))
        .all(conn)
        .await
}

pub async fn row_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &str,
    id: i32,
) -> Result<Option<LookupRow>, sea_orm::DbErr> {
    let sql = format!(
        "SELECT id, name, order_index FROM {} WHERE id = $1",
        qualified(table)
    );
    LookupRow::find_by_statement(statement(conn, sql, [id.into()]))
        .one(conn)
        .await
}

pub async fn insert_row<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &str,
    name: &str,
    order_index: Option<i32>,
) -> Result<u64, sea_orm::DbErr> {
    let sql = format!(
        "INSERT INTO {} (name, order_index) VALUES ($1, $2)",
        qualified(table)
    );
    let res = conn
        .execute(statement(conn, sql, [name.into(), order_index.into()]))
        .await?;
    Ok(res.rows_affected())
}

pub async fn update_row<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &str,
    id: i32,
    name: &str,
    order_index: Option<i32>,
) -> Result<u64, sea_orm::DbErr> {
    let sql = format!(
        "UPDATE {} SET name = $1, order_index = $2 WHERE id = $3",
        qualified(table)
    );
    let res = conn
        .execute(statement(
            conn,
            sql,
            [name.into(), order_index.into(), id.into()],
        ))
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_row<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &str,
    id: i32,
) -> Result<u64, sea_orm::DbErr> {
    let sql = format!("DELETE FROM {} WHERE id = $1", qualified(table));
    let res = conn.execute(statement(conn, sql, [id.into()])).await?;
    Ok(res.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_must_be_alphanumeric() {
        assert!(is_valid_table_name("Nationalities"));
        assert!(is_valid_table_name("Table2"));
        assert!(!is_valid_table_name(""));
        assert!(!is_valid_table_name("Languages; DROP TABLE users"));
        assert!(!is_valid_table_name("lookups.Languages"));
        assert!(!is_valid_table_name("Payments_Types"));
    }

    #[test]
    fn rows_serialize_camel_case() {
        let row = LookupRow {
            id: 1,
            name: "English".into(),
            order_index: Some(2),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "name": "English", "orderIndex": 2}));
    }
}

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
#[iden = "lookups"]
struct LookupsSchema;

#[derive(Iden)]
enum LookupColumn {
    Id,
    Name,
    OrderIndex,
}

const TABLES: [&str; 3] = ["Languages", "Nationalities", "PaymentsTypes"];

fn lookup_table(name: &str) -> TableCreateStatement {
    Table::create()
        .table((LookupsSchema, Alias::new(name)))
        .if_not_exists()
        .col(
            ColumnDef::new(LookupColumn::Id)
                .integer()
                .not_null()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(LookupColumn::Name).string_len(100).not_null())
        .col(ColumnDef::new(LookupColumn::OrderIndex).integer().null())
        .to_owned()
}

fn seed(table: &str, rows: &[(&str, Option<i32>)]) -> InsertStatement {
    let mut insert = Query::insert();
    insert
        .into_table((LookupsSchema, Alias::new(table)))
        .columns([LookupColumn::Name, LookupColumn::OrderIndex]);
    for (name, order_index) in rows {
        insert.values_panic([(*name).into(), (*order_index).into()]);
    }
    insert.to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS lookups")
            .await?;

        for table in TABLES {
            manager.create_table(lookup_table(table)).await?;
        }

        manager
            .exec_stmt(seed(
                "Languages",
                &[("English", Some(1)), ("Arabic", Some(2))],
            ))
            .await?;
        manager
            .exec_stmt(seed(
                "Nationalities",
                &[("Egyptian", None), ("Saudi", None), ("Emirati", None)],
            ))
            .await?;
        manager
            .exec_stmt(seed(
                "PaymentsTypes",
                &[("Cash", Some(1)), ("Card", Some(2)), ("Wallet", None)],
            ))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in TABLES {
            manager
                .drop_table(
                    Table::drop()
                        .table((LookupsSchema, Alias::new(table)))
                        .if_exists()
                        .to_owned(),
                )
                .await?;
        }
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS lookups")
            .await?;
        Ok(())
    }
}

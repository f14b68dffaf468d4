use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    Price,
    CreatedDate,
}

#[derive(Iden)]
enum Audits {
    Table,
    Id,
    UserId,
    Type,
    TableName,
    DateTime,
    OldValues,
    NewValues,
    AffectedColumns,
    PrimaryKey,
}

#[derive(Iden)]
enum LoginLogs {
    Table,
    Id,
    UserId,
    Role,
    LoginDate,
    IpAddress,
    Email,
    Name,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Products::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Products::Description)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::Price).decimal_len(18, 0).not_null())
                    .col(ColumnDef::new(Products::CreatedDate).date().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Audits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Audits::Id)
                            .integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Audits::UserId).string().null())
                    .col(ColumnDef::new(Audits::Type).string_len(16).not_null())
                    .col(ColumnDef::new(Audits::TableName).string().not_null())
                    .col(
                        ColumnDef::new(Audits::DateTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Audits::OldValues).text().null())
                    .col(ColumnDef::new(Audits::NewValues).text().null())
                    .col(ColumnDef::new(Audits::AffectedColumns).text().null())
                    .col(ColumnDef::new(Audits::PrimaryKey).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_audits_table_name_date_time")
                    .table(Audits::Table)
                    .col(Audits::TableName)
                    .col(Audits::DateTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LoginLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoginLogs::Id)
                            .integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(LoginLogs::UserId).string().not_null())
                    .col(ColumnDef::new(LoginLogs::Role).string().not_null())
                    .col(
                        ColumnDef::new(LoginLogs::LoginDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LoginLogs::IpAddress).string().not_null())
                    .col(ColumnDef::new(LoginLogs::Email).string().not_null())
                    .col(ColumnDef::new(LoginLogs::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_login_logs_user_id")
                    .table(LoginLogs::Table)
                    .col(LoginLogs::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoginLogs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Audits::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).if_exists().to_owned())
            .await
    }
}

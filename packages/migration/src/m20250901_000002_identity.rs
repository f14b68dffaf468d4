use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

use crate::unique_indexes;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    UserName,
    PasswordHash,
    PhoneNumber,
    PhoneNumberConfirmed,
    EmailConfirmed,
    TwoFactorEnabled,
    TwoFactorSecret,
    LockoutEnd,
    AccessFailedCount,
    BlockedFromCash,
    GoogleSubject,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserRoles {
    Table,
    UserId,
    Role,
}

#[derive(Iden)]
enum UserTokens {
    Table,
    Id,
    UserId,
    Purpose,
    TokenHash,
    ExpiresAt,
    ConsumedAt,
}

#[derive(Iden)]
enum RefreshTokens {
    Table,
    Id,
    UserId,
    Token,
    ExpiresOn,
    CreatedOn,
    RevokedOn,
}

#[derive(Iden)]
enum UsersOtp {
    Table,
    Id,
    UserId,
    Otp,
    OtpType,
    IpAddress,
    CreatedAt,
    ExpiresAt,
}

fn user_fk<T: IntoIden + 'static>(
    name: &str,
    table: T,
    column: impl IntoIden + 'static,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(Users::Table, Users::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string_len(36).not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string_len(256).not_null())
                    .col(ColumnDef::new(Users::UserName).string_len(256).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().null())
                    .col(ColumnDef::new(Users::PhoneNumber).string_len(32).null())
                    .col(
                        ColumnDef::new(Users::PhoneNumberConfirmed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::EmailConfirmed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::TwoFactorEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::TwoFactorSecret).string().null())
                    .col(
                        ColumnDef::new(Users::LockoutEnd)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::AccessFailedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::BlockedFromCash)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::GoogleSubject).string().null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            (unique_indexes::USERS_EMAIL, Users::Email),
            (unique_indexes::USERS_PHONE_NUMBER, Users::PhoneNumber),
            (unique_indexes::USERS_GOOGLE_SUBJECT, Users::GoogleSubject),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Users::Table)
                        .col(column)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(UserRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserRoles::UserId).string_len(36).not_null())
                    .col(ColumnDef::new(UserRoles::Role).string_len(64).not_null())
                    .primary_key(Index::create().col(UserRoles::UserId).col(UserRoles::Role))
                    .foreign_key(&mut user_fk(
                        "fk_user_roles_user_id",
                        UserRoles::Table,
                        UserRoles::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserTokens::Id)
                            .integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(UserTokens::UserId).string_len(36).not_null())
                    .col(ColumnDef::new(UserTokens::Purpose).string_len(32).not_null())
                    .col(ColumnDef::new(UserTokens::TokenHash).string_len(64).not_null())
                    .col(
                        ColumnDef::new(UserTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTokens::ConsumedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_user_tokens_user_id",
                        UserTokens::Table,
                        UserTokens::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_user_tokens_user_purpose")
                    .table(UserTokens::Table)
                    .col(UserTokens::UserId)
                    .col(UserTokens::Purpose)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RefreshTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RefreshTokens::Id)
                            .integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(RefreshTokens::UserId).string_len(36).not_null())
                    .col(ColumnDef::new(RefreshTokens::Token).string().not_null())
                    .col(
                        ColumnDef::new(RefreshTokens::ExpiresOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RefreshTokens::CreatedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RefreshTokens::RevokedOn)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_refresh_tokens_user_id",
                        RefreshTokens::Table,
                        RefreshTokens::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(unique_indexes::REFRESH_TOKENS_TOKEN)
                    .table(RefreshTokens::Table)
                    .col(RefreshTokens::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UsersOtp::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsersOtp::Id)
                            .integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(UsersOtp::UserId).string_len(36).not_null())
                    .col(ColumnDef::new(UsersOtp::Otp).string_len(8).not_null())
                    .col(ColumnDef::new(UsersOtp::OtpType).string_len(32).not_null())
                    .col(ColumnDef::new(UsersOtp::IpAddress).string().not_null())
                    .col(
                        ColumnDef::new(UsersOtp::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UsersOtp::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_users_otp_user_id",
                        UsersOtp::Table,
                        UsersOtp::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_users_otp_user_id_expires_at")
                    .table(UsersOtp::Table)
                    .col(UsersOtp::UserId)
                    .col(UsersOtp::ExpiresAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            UsersOtp::Table.into_iden(),
            RefreshTokens::Table.into_iden(),
            UserTokens::Table.into_iden(),
            UserRoles::Table.into_iden(),
            Users::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub email: String,
    #[sea_orm(column_name = "user_name")]
    pub user_name: String,
    #[serde(skip_serializing)]
    #[sea_orm(column_name = "password_hash")]
    pub password_hash: Option<String>,
    #[sea_orm(column_name = "phone_number")]
    pub phone_number: Option<String>,
    #[sea_orm(column_name = "phone_number_confirmed")]
    pub phone_number_confirmed: bool,
    #[sea_orm(column_name = "email_confirmed")]
    pub email_confirmed: bool,
    #[sea_orm(column_name = "two_factor_enabled")]
    pub two_factor_enabled: bool,
    #[serde(skip_serializing)]
    #[sea_orm(column_name = "two_factor_secret")]
    pub two_factor_secret: Option<String>,
    #[sea_orm(column_name = "lockout_end")]
    pub lockout_end: Option<OffsetDateTime>,
    #[sea_orm(column_name = "access_failed_count")]
    pub access_failed_count: i32,
    #[sea_orm(column_name = "blocked_from_cash")]
    pub blocked_from_cash: bool,
    #[sea_orm(column_name = "google_subject")]
    pub google_subject: Option<String>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_roles::Entity")]
    UserRoles,
    #[sea_orm(has_many = "super::refresh_tokens::Entity")]
    RefreshTokens,
    #[sea_orm(has_many = "super::user_tokens::Entity")]
    UserTokens,
    #[sea_orm(has_many = "super::users_otp::Entity")]
    UsersOtp,
}

impl Related<super::user_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoles.def()
    }
}

impl Related<super::refresh_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RefreshTokens.def()
    }
}

impl Related<super::user_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserTokens.def()
    }
}

impl Related<super::users_otp::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsersOtp.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

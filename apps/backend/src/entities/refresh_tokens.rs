use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "refresh_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "user_id")]
    pub user_id: String,
    pub token: String,
    #[sea_orm(column_name = "expires_on")]
    pub expires_on: OffsetDateTime,
    #[sea_orm(column_name = "created_on")]
    pub created_on: OffsetDateTime,
    #[sea_orm(column_name = "revoked_on")]
    pub revoked_on: Option<OffsetDateTime>,
}

impl Model {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_on
    }

    /// Not revoked and not expired.
    pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
        self.revoked_on.is_none() && !self.is_expired_at(now)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

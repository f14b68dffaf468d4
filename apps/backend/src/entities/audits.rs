use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "user_id")]
    pub user_id: Option<String>,
    #[sea_orm(column_name = "type")]
    pub audit_type: String,
    #[sea_orm(column_name = "table_name")]
    pub table_name: String,
    #[sea_orm(column_name = "date_time")]
    pub date_time: OffsetDateTime,
    #[sea_orm(column_name = "old_values")]
    pub old_values: Option<String>,
    #[sea_orm(column_name = "new_values")]
    pub new_values: Option<String>,
    #[sea_orm(column_name = "affected_columns")]
    pub affected_columns: Option<String>,
    #[sea_orm(column_name = "primary_key")]
    pub primary_key: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

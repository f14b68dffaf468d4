//! SeaORM adapter for single-use user tokens.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, NotSet,
    QueryFilter, Set,
};
use time::OffsetDateTime;

use crate::entities::user_tokens;

pub async fn insert_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    purpose: &str,
    token_hash: &str,
    expires_at: OffsetDateTime,
) -> Result<user_tokens::Model, sea_orm::DbErr> {
    user_tokens::ActiveModel {
        id: NotSet,
        user_id: Set(user_id.to_string()),
        purpose: Set(purpose.to_string()),
        token_hash: Set(token_hash.to_string()),
        expires_at: Set(expires_at),
        consumed_at: Set(None),
    }
    .insert(conn)
    .await
}

/// Unconsumed, unexpired token matching `token_hash`.
pub async fn find_usable<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    purpose: &str,
    token_hash: &str,
    now: OffsetDateTime,
) -> Result<Option<user_tokens::Model>, sea_orm::DbErr> {
    user_tokens::Entity::find()
        .filter(user_tokens::Column::UserId.eq(user_id))
        .filter(user_tokens::Column::Purpose.eq(purpose))
        .filter(user_tokens::Column::TokenHash.eq(token_hash))
        .filter(user_tokens::Column::ConsumedAt.is_null())
        .filter(user_tokens::Column::ExpiresAt.gt(now))
        .one(conn)
        .await
}

pub async fn consume<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    token: user_tokens::Model,
    at: OffsetDateTime,
) -> Result<(), sea_orm::DbErr> {
    let mut active = token.into_active_model();
    active.consumed_at = Set(Some(at));
    active.update(conn).await?;
    Ok(())
}

//! SeaORM adapter for refresh tokens.

use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, NotSet,
    QueryFilter, QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::refresh_tokens;

pub async fn find_by_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    token: &str,
) -> Result<Option<refresh_tokens::Model>, sea_orm::DbErr> {
    refresh_tokens::Entity::find()
        .filter(refresh_tokens::Column::Token.eq(token))
        .one(conn)
        .await
}

/// Newest unrevoked, unexpired token of `user_id`.
pub async fn newest_active_for_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    now: OffsetDateTime,
) -> Result<Option<refresh_tokens::Model>, sea_orm::DbErr> {
    refresh_tokens::Entity::find()
        .filter(refresh_tokens::Column::UserId.eq(user_id))
        .filter(refresh_tokens::Column::RevokedOn.is_null())
        .filter(refresh_tokens::Column::ExpiresOn.gt(now))
        .order_by_desc(refresh_tokens::Column::CreatedOn)
        .one(conn)
        .await
}

pub async fn insert_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    token: &str,
    created_on: OffsetDateTime,
    expires_on: OffsetDateTime,
) -> Result<refresh_tokens::Model, sea_orm::DbErr> {
    refresh_tokens::ActiveModel {
        id: NotSet,
        user_id: Set(user_id.to_string()),
        token: Set(token.to_string()),
        expires_on: Set(expires_on),
        created_on: Set(created_on),
        revoked_on: Set(None),
    }
    .insert(conn)
    .await
}

pub async fn revoke<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    token: refresh_tokens::Model,
    at: OffsetDateTime,
) -> Result<refresh_tokens::Model, sea_orm::DbErr> {
    let mut active = token.into_active_model();
    active.revoked_on = Set(Some(at));
    active.update(conn).await
}

/// Drop revoked or expired tokens of `user_id`.
pub async fn purge_inactive_for_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    now: OffsetDateTime,
) -> Result<u64, sea_orm::DbErr> {
    let res = refresh_tokens::Entity::delete_many()
        .filter(refresh_tokens::Column::UserId.eq(user_id))
        .filter(
            Condition::any()
                .add(refresh_tokens::Column::RevokedOn.is_not_null())
                .add(refresh_tokens::Column::ExpiresOn.lte(now)),
        )
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}

//! SeaORM adapter for one-time passwords.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};
use time::OffsetDateTime;

use crate::entities::users_otp;

#[derive(Debug, Clone)]
pub struct OtpCreate {
    pub user_id: String,
    pub otp: String,
    pub otp_type: String,
    pub ip_address: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

pub async fn insert_otp<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: OtpCreate,
) -> Result<users_otp::Model, sea_orm::DbErr> {
    users_otp::ActiveModel {
        id: NotSet,
        user_id: Set(dto.user_id),
        otp: Set(dto.otp),
        otp_type: Set(dto.otp_type),
        ip_address: Set(dto.ip_address),
        created_at: Set(dto.created_at),
        expires_at: Set(dto.expires_at),
    }
    .insert(conn)
    .await
}

pub async fn latest_for_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<Option<users_otp::Model>, sea_orm::DbErr> {
    users_otp::Entity::find()
        .filter(users_otp::Column::UserId.eq(user_id))
        .order_by_desc(users_otp::Column::CreatedAt)
        .one(conn)
        .await
}

/// Newest unexpired OTP of `user_id` equal to `otp`.
pub async fn find_valid<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    otp: &str,
    now: OffsetDateTime,
) -> Result<Option<users_otp::Model>, sea_orm::DbErr> {
    users_otp::Entity::find()
        .filter(users_otp::Column::UserId.eq(user_id))
        .filter(users_otp::Column::Otp.eq(otp))
        .filter(users_otp::Column::ExpiresAt.gt(now))
        .order_by_desc(users_otp::Column::CreatedAt)
        .one(conn)
        .await
}

/// Used OTPs are deleted so they cannot be replayed.
pub async fn delete_for_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<u64, sea_orm::DbErr> {
    let res = users_otp::Entity::delete_many()
        .filter(users_otp::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}

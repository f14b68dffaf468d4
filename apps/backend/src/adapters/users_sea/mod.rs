//! SeaORM adapter for users and their roles.

use sea_orm::ActiveValue::Unchanged;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{user_roles, users};
use crate::utils::text::normalize_email;

pub mod dto;

pub use dto::{UserCreate, UserUpdate};

// Adapter functions return DbErr; repos layer maps to DomainError via From<DbErr>.

pub async fn find_user_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find_by_id(user_id.to_string()).one(conn).await
}

/// Case-insensitive email lookup.
pub async fn find_user_by_email<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find()
        .filter(users::Column::Email.eq(normalize_email(email)))
        .one(conn)
        .await
}

pub async fn find_user_by_phone<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    phone_number: &str,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find()
        .filter(users::Column::PhoneNumber.eq(phone_number.trim()))
        .one(conn)
        .await
}

pub async fn find_user_by_google_subject<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    subject: &str,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find()
        .filter(users::Column::GoogleSubject.eq(subject))
        .one(conn)
        .await
}

pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: UserCreate,
) -> Result<users::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let user_active = users::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        email: Set(normalize_email(&dto.email)),
        user_name: Set(dto.user_name),
        password_hash: Set(dto.password_hash),
        phone_number: Set(dto.phone_number),
        phone_number_confirmed: Set(false),
        email_confirmed: Set(dto.email_confirmed),
        two_factor_enabled: Set(false),
        two_factor_secret: Set(None),
        lockout_end: Set(None),
        access_failed_count: Set(0),
        blocked_from_cash: Set(false),
        google_subject: Set(dto.google_subject),
        created_at: Set(now),
        updated_at: Set(now),
    };

    user_active.insert(conn).await
}

/// Write only the columns present in `dto`.
pub async fn update_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    dto: UserUpdate,
) -> Result<users::Model, sea_orm::DbErr> {
    let mut active = users::ActiveModel {
        id: Unchanged(user_id.to_string()),
        updated_at: Set(time::OffsetDateTime::now_utc()),
        ..Default::default()
    };
    if let Some(email) = dto.email {
        active.email = Set(normalize_email(&email));
    }
    if let Some(user_name) = dto.user_name {
        active.user_name = Set(user_name);
    }
    if let Some(hash) = dto.password_hash {
        active.password_hash = Set(Some(hash));
    }
    if let Some(confirmed) = dto.email_confirmed {
        active.email_confirmed = Set(confirmed);
    }
    if let Some(confirmed) = dto.phone_number_confirmed {
        active.phone_number_confirmed = Set(confirmed);
    }
    if let Some(enabled) = dto.two_factor_enabled {
        active.two_factor_enabled = Set(enabled);
    }
    if let Some(secret) = dto.two_factor_secret {
        active.two_factor_secret = Set(secret);
    }
    if let Some(lockout_end) = dto.lockout_end {
        active.lockout_end = Set(lockout_end);
    }
    if let Some(count) = dto.access_failed_count {
        active.access_failed_count = Set(count);
    }
    if let Some(blocked) = dto.blocked_from_cash {
        active.blocked_from_cash = Set(blocked);
    }
    if let Some(subject) = dto.google_subject {
        active.google_subject = Set(subject);
    }
    active.update(conn).await
}

pub async fn delete_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<u64, sea_orm::DbErr> {
    let res = users::Entity::delete_by_id(user_id.to_string())
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}

pub async fn roles_for_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<Vec<String>, sea_orm::DbErr> {
    user_roles::Entity::find()
        .select_only()
        .column(user_roles::Column::Role)
        .filter(user_roles::Column::UserId.eq(user_id))
        .order_by_asc(user_roles::Column::Role)
        .into_tuple::<String>()
        .all(conn)
        .await
}

pub async fn add_role<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    role: &str,
) -> Result<(), sea_orm::DbErr> {
    user_roles::ActiveModel {
        user_id: Set(user_id.to_string()),
        role: Set(role.to_string()),
    }
    .insert(conn)
    .await?;
    Ok(())
}

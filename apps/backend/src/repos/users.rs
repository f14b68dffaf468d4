//! User repository functions for domain layer (generic over ConnectionTrait).

use sea_orm::{ConnectionTrait, DbErr};
use time::OffsetDateTime;

use crate::adapters::users_sea as users_adapter;
use crate::errors::domain::{DomainError, NotFoundKind};

pub use users_adapter::{UserCreate, UserUpdate};

/// User domain model
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub user_name: String,
    pub password_hash: Option<String>,
    pub phone_number: Option<String>,
    pub phone_number_confirmed: bool,
    pub email_confirmed: bool,
    pub two_factor_enabled: bool,
    pub two_factor_secret: Option<String>,
    pub lockout_end: Option<OffsetDateTime>,
    pub access_failed_count: i32,
    pub blocked_from_cash: bool,
    pub google_subject: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn is_locked_at(&self, now: OffsetDateTime) -> bool {
        self.lockout_end.is_some_and(|end| end > now)
    }
}

fn user_not_found(user_id: &str) -> DomainError {
    DomainError::not_found(NotFoundKind::User, format!("user {user_id} not found"))
}

pub async fn find_user_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<Option<User>, DomainError> {
    let user = users_adapter::find_user_by_id(conn, user_id).await?;
    Ok(user.map(User::from))
}

pub async fn require_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<User, DomainError> {
    find_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))
}

pub async fn find_user_by_email<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
) -> Result<Option<User>, DomainError> {
    let user = users_adapter::find_user_by_email(conn, email).await?;
    Ok(user.map(User::from))
}

pub async fn find_user_by_phone<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    phone_number: &str,
) -> Result<Option<User>, DomainError> {
    let user = users_adapter::find_user_by_phone(conn, phone_number).await?;
    Ok(user.map(User::from))
}

pub async fn find_user_by_google_subject<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    subject: &str,
) -> Result<Option<User>, DomainError> {
    let user = users_adapter::find_user_by_google_subject(conn, subject).await?;
    Ok(user.map(User::from))
}

/// Insert the user and attach `roles`.
pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: UserCreate,
    roles: &[&str],
) -> Result<User, DomainError> {
    let user = users_adapter::create_user(conn, dto).await?;
    for role in roles {
        users_adapter::add_role(conn, &user.id, role).await?;
    }
    Ok(User::from(user))
}

pub async fn update_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    dto: UserUpdate,
) -> Result<User, DomainError> {
    match users_adapter::update_user(conn, user_id, dto).await {
        Ok(user) => Ok(User::from(user)),
        Err(DbErr::RecordNotUpdated) => Err(user_not_found(user_id)),
        Err(e) => Err(e.into()),
    }
}

/// Returns `false` when no row was deleted.
pub async fn delete_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<bool, DomainError> {
    Ok(users_adapter::delete_user(conn, user_id).await? > 0)
}

pub async fn roles_for_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<Vec<String>, DomainError> {
    Ok(users_adapter::roles_for_user(conn, user_id).await?)
}

// Conversions between SeaORM models and domain models

impl From<crate::entities::users::Model> for User {
    fn from(model: crate::entities::users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            user_name: model.user_name,
            password_hash: model.password_hash,
            phone_number: model.phone_number,
            phone_number_confirmed: model.phone_number_confirmed,
            email_confirmed: model.email_confirmed,
            two_factor_enabled: model.two_factor_enabled,
            two_factor_secret: model.two_factor_secret,
            lockout_end: model.lockout_end,
            access_failed_count: model.access_failed_count,
            blocked_from_cash: model.blocked_from_cash,
            google_subject: model.google_subject,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

//! Administrative changes to other users' accounts.

use sea_orm::ConnectionTrait;
use time::macros::datetime;
use time::OffsetDateTime;
use tracing::warn;

use super::{AdminChangePasswordDto, BlockFromCashDto, ChangeEmailDto, LockAccountDto};
use crate::auth::password::{hash_password, meets_policy};
use crate::error::AppError;
use crate::errors::MessageKey;
use crate::logging::security;
use crate::repos::users::{self, User, UserUpdate};
use crate::utils::text::normalize_email;

/// Lockout end used for indefinite locks.
pub const LOCKED_UNTIL_FURTHER_NOTICE: OffsetDateTime = datetime!(9999-12-31 23:59:59 UTC);

async fn target_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    missing: MessageKey,
) -> Result<User, AppError> {
    users::find_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| missing.into())
}

async fn lock_indefinitely<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<(), AppError> {
    let update = UserUpdate {
        lockout_end: Some(Some(LOCKED_UNTIL_FURTHER_NOTICE)),
        ..Default::default()
    };
    users::update_user(conn, user_id, update).await?;
    Ok(())
}

/// Delete the account. When the row cannot be deleted (still referenced,
/// for instance) the account is locked instead and `UserAccountIsLockedOut`
/// is returned.
pub async fn delete_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    actor_id: &str,
    user_id: &str,
) -> Result<(), AppError> {
    let user = target_user(conn, user_id, MessageKey::UserWithIdNotFound).await?;
    match users::delete_user(conn, &user.id).await {
        Ok(true) => {
            security::admin_action("delete_user", actor_id, user_id);
            Ok(())
        }
        Ok(false) | Err(_) => {
            warn!(user_id, "user delete failed, locking account instead");
            lock_indefinitely(conn, &user.id).await?;
            security::admin_action("lock_after_failed_delete", actor_id, user_id);
            Err(MessageKey::UserLockedOut.into())
        }
    }
}

pub async fn change_email<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    actor_id: &str,
    dto: &ChangeEmailDto,
) -> Result<(), AppError> {
    let user = target_user(conn, &dto.user_id, MessageKey::UserNotFound).await?;
    let new_email = dto.new_email.trim();
    if user.email.eq_ignore_ascii_case(new_email) {
        return Err(MessageKey::SameEmail.into());
    }
    if users::find_user_by_email(conn, new_email).await?.is_some() {
        return Err(MessageKey::EmailAlreadyInUse.into());
    }

    let user_name = user
        .user_name
        .eq_ignore_ascii_case(&user.email)
        .then(|| normalize_email(new_email));
    let update = UserUpdate {
        email: Some(new_email.to_string()),
        user_name,
        email_confirmed: Some(false),
        ..Default::default()
    };
    users::update_user(conn, &user.id, update).await?;
    security::admin_action("change_email", actor_id, &user.id);
    Ok(())
}

pub async fn change_password_for<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    actor_id: &str,
    dto: &AdminChangePasswordDto,
) -> Result<(), AppError> {
    let user = target_user(conn, &dto.user_id, MessageKey::UserNotFound).await?;
    if !meets_policy(&dto.new_password) {
        return Err(MessageKey::WeakPassword.into());
    }
    let update = UserUpdate {
        password_hash: Some(hash_password(&dto.new_password).await?),
        ..Default::default()
    };
    users::update_user(conn, &user.id, update).await?;
    security::admin_action("change_password", actor_id, &user.id);
    Ok(())
}

/// Returns the message describing the new state.
pub async fn lock_or_unlock<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    actor_id: &str,
    dto: &LockAccountDto,
) -> Result<MessageKey, AppError> {
    let user = target_user(conn, &dto.user_id, MessageKey::UserNotFound).await?;
    if dto.lock {
        lock_indefinitely(conn, &user.id).await?;
        security::admin_action("lock_account", actor_id, &user.id);
        return Ok(MessageKey::AccountLockedSuccessfully);
    }
    let update = UserUpdate {
        lockout_end: Some(None),
        access_failed_count: Some(0),
        ..Default::default()
    };
    users::update_user(conn, &user.id, update).await?;
    security::admin_action("unlock_account", actor_id, &user.id);
    Ok(MessageKey::AccountUnlockedSuccessfully)
}

pub async fn block_from_cash<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    actor_id: &str,
    dto: &BlockFromCashDto,
) -> Result<(), AppError> {
    let user = target_user(conn, &dto.user_id, MessageKey::UserNotFound).await?;
    let update = UserUpdate {
        blocked_from_cash: Some(dto.block),
        ..Default::default()
    };
    users::update_user(conn, &user.id, update).await?;
    security::admin_action(
        if dto.block { "block_from_cash" } else { "unblock_from_cash" },
        actor_id,
        &user.id,
    );
    Ok(())
}

/// Unknown users count as blocked.
pub async fn blocked_from_cash<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<bool, AppError> {
    Ok(users::find_user_by_id(conn, user_id)
        .await?
        .is_none_or(|user| user.blocked_from_cash))
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};

    use super::*;
    use crate::entities::users as user_entity;
    use crate::test_support::fixtures::user_model;

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn delete_succeeds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model("u1", "a@example.com")]])
            .append_exec_results([exec(1)])
            .into_connection();
        delete_user(&db, "admin", "u1").await.unwrap();
    }

    #[tokio::test]
    async fn referenced_user_is_locked_instead() {
        let user = user_model("u1", "a@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .append_exec_errors([DbErr::Exec(RuntimeErr::Internal(
                "violates foreign key constraint".into(),
            ))])
            .append_query_results([vec![user]])
            .into_connection();
        let err = delete_user(&db, "admin", "u1").await.unwrap_err();
        assert_eq!(err.to_string(), "Bad request: UserAccountIsLockedOut");

        let log = db.into_transaction_log();
        let last = format!("{:?}", log.last().unwrap());
        assert!(last.contains("lockout_end"), "{last}");
        assert!(last.contains("9999-12-31"), "{last}");
    }

    #[tokio::test]
    async fn same_email_is_refused() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model("u1", "a@example.com")]])
            .into_connection();
        let dto = ChangeEmailDto {
            user_id: "u1".into(),
            new_email: "A@example.com".into(),
        };
        let err = change_email(&db, "admin", &dto).await.unwrap_err();
        assert_eq!(err.to_string(), "Bad request: TheNewEmailIsTheSameAsTheCurrentEmail");
    }

    #[tokio::test]
    async fn changed_email_needs_confirmation_again() {
        let user = user_model("u1", "a@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .append_query_results([Vec::<user_entity::Model>::new()])
            .append_query_results([vec![user]])
            .into_connection();
        let dto = ChangeEmailDto {
            user_id: "u1".into(),
            new_email: "b@example.com".into(),
        };
        change_email(&db, "admin", &dto).await.unwrap();

        let log = db.into_transaction_log();
        let last = format!("{:?}", log.last().unwrap());
        assert!(last.contains("email_confirmed"), "{last}");
        assert!(last.contains("b@example.com"), "{last}");
    }

    #[tokio::test]
    async fn lock_and_unlock_messages() {
        let user = user_model("u1", "a@example.com");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()], vec![user.clone()]])
            .append_query_results([vec![user.clone()], vec![user]])
            .into_connection();
        let lock = LockAccountDto {
            user_id: "u1".into(),
            lock: true,
        };
        assert_eq!(
            lock_or_unlock(&db, "admin", &lock).await.unwrap(),
            MessageKey::AccountLockedSuccessfully
        );
        let unlock = LockAccountDto {
            user_id: "u1".into(),
            lock: false,
        };
        assert_eq!(
            lock_or_unlock(&db, "admin", &unlock).await.unwrap(),
            MessageKey::AccountUnlockedSuccessfully
        );
    }

    #[tokio::test]
    async fn unknown_user_counts_as_blocked() {
        let mut blocked = user_model("u2", "b@example.com");
        blocked.blocked_from_cash = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_entity::Model>::new()])
            .append_query_results([vec![user_model("u1", "a@example.com")]])
            .append_query_results([vec![blocked]])
            .into_connection();
        assert!(blocked_from_cash(&db, "ghost").await.unwrap());
        assert!(!blocked_from_cash(&db, "u1").await.unwrap());
        assert!(blocked_from_cash(&db, "u2").await.unwrap());
    }
}

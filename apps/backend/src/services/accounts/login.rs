//! Password sign-in with lockout, and its two-factor variant.

use sea_orm::ConnectionTrait;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::{LoginDto, TwoFactorLoginDto};
use crate::auth::password::verify_password;
use crate::auth::totp;
use crate::error::AppError;
use crate::errors::MessageKey;
use crate::logging::security;
use crate::repos::users::{self, User, UserUpdate};
use crate::services::tokens::{issue_session, SessionUser};
use crate::state::SecurityConfig;

/// Consecutive failures that lock an account.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;
pub const LOCKOUT_DURATION: Duration = Duration::minutes(15);

/// Count a failed password attempt, locking the account on the fifth.
async fn record_failure<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: &User,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    let failures = user.access_failed_count + 1;
    let update = if failures >= MAX_FAILED_ATTEMPTS {
        let until = now + LOCKOUT_DURATION;
        security::account_locked(&user.id, until);
        UserUpdate {
            lockout_end: Some(Some(until)),
            access_failed_count: Some(0),
            ..Default::default()
        }
    } else {
        UserUpdate {
            access_failed_count: Some(failures),
            ..Default::default()
        }
    };
    users::update_user(conn, &user.id, update).await?;
    Ok(())
}

/// The account behind `email` when `password` matches and it is not locked.
pub(crate) async fn check_credentials<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
    password: &str,
    now: OffsetDateTime,
) -> Result<User, AppError> {
    let Some(user) = users::find_user_by_email(conn, email).await? else {
        security::login_failed("unknown_email", email);
        return Err(MessageKey::InvalidEmailOrPassword.into());
    };
    if user.is_locked_at(now) {
        security::login_failed("locked", email);
        return Err(MessageKey::AccountLocked.into());
    }

    let matches = match user.password_hash.as_deref() {
        Some(hash) => verify_password(password, hash).await,
        None => false,
    };
    if !matches {
        security::login_failed("bad_password", email);
        record_failure(conn, &user, now).await?;
        return Err(MessageKey::InvalidEmailOrPassword.into());
    }

    if user.access_failed_count > 0 || user.lockout_end.is_some() {
        let update = UserUpdate {
            access_failed_count: Some(0),
            lockout_end: Some(None),
            ..Default::default()
        };
        return Ok(users::update_user(conn, &user.id, update).await?);
    }
    Ok(user)
}

pub async fn login<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: &LoginDto,
    security: &SecurityConfig,
    ip: &str,
    now: OffsetDateTime,
) -> Result<SessionUser, AppError> {
    let user = check_credentials(conn, &dto.email, &dto.password, now).await?;
    if user.two_factor_enabled {
        debug!(user_id = %user.id, "second factor required");
        return Err(MessageKey::TwoFactorCodeRequired.into());
    }
    issue_session(conn, &user, security, ip, now).await
}

pub async fn two_factor_login<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: &TwoFactorLoginDto,
    security: &SecurityConfig,
    ip: &str,
    now: OffsetDateTime,
) -> Result<SessionUser, AppError> {
    let user = check_credentials(conn, &dto.email, &dto.password, now).await?;
    let valid = match user.two_factor_secret.as_deref() {
        Some(secret) => totp::verify_code(secret, &user.email, &dto.code)?,
        None => false,
    };
    if !valid {
        security::login_failed("bad_totp_code", &user.email);
        return Err(MessageKey::InvalidTwoFactorCode.into());
    }
    issue_session(conn, &user, security, ip, now).await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    use super::*;
    use crate::entities::{login_logs, users as user_entity};
    use crate::test_support::fixtures::{
        refresh_token_model, test_security, user_model, user_with_password, FIXED_NOW,
    };

    const PASSWORD: &str = "Secret1!";

    fn dto(password: &str) -> LoginDto {
        LoginDto {
            email: "a@example.com".into(),
            password: password.into(),
        }
    }

    fn role_row(role: &str) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("role", Value::from(role.to_string()))])
    }

    fn login_log_model() -> login_logs::Model {
        login_logs::Model {
            id: 1,
            user_id: "u1".into(),
            role: "Admin".into(),
            login_date: FIXED_NOW,
            ip_address: "127.0.0.1".into(),
            email: "a@example.com".into(),
            name: "Admin".into(),
        }
    }

    #[tokio::test]
    async fn unknown_email_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user_entity::Model>::new()])
            .into_connection();
        let err = login(&db, &dto(PASSWORD), &test_security(), "127.0.0.1", FIXED_NOW)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: InvalidEmailOrPassword");
    }

    #[tokio::test]
    async fn locked_account_is_rejected_before_password_check() {
        let mut user = user_with_password("u1", "a@example.com", PASSWORD);
        user.lockout_end = Some(FIXED_NOW + Duration::minutes(3));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .into_connection();
        let err = login(&db, &dto(PASSWORD), &test_security(), "127.0.0.1", FIXED_NOW)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: AccountLockedPleaseTryAgainLater");
    }

    #[tokio::test]
    async fn fifth_failure_locks_for_fifteen_minutes() {
        let mut user = user_with_password("u1", "a@example.com", PASSWORD);
        user.access_failed_count = MAX_FAILED_ATTEMPTS - 1;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .append_query_results([vec![user]])
            .into_connection();
        let err = login(&db, &dto("Wrong1!x"), &test_security(), "127.0.0.1", FIXED_NOW)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: InvalidEmailOrPassword");

        let log = db.into_transaction_log();
        let last = format!("{:?}", log.last().unwrap());
        assert!(last.split("WHERE").next().unwrap().contains("lockout_end"), "{last}");
        assert!(last.contains("2025-01-15 10:15"), "{last}");
    }

    #[tokio::test]
    async fn early_failure_only_counts() {
        let user = user_with_password("u1", "a@example.com", PASSWORD);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .append_query_results([vec![user]])
            .into_connection();
        login(&db, &dto("Wrong1!x"), &test_security(), "127.0.0.1", FIXED_NOW)
            .await
            .unwrap_err();

        let log = db.into_transaction_log();
        let last = format!("{:?}", log.last().unwrap());
        let set_clause = last.split("WHERE").next().unwrap();
        assert!(set_clause.contains("UPDATE"), "{last}");
        assert!(set_clause.contains("access_failed_count"), "{last}");
        assert!(!set_clause.contains("lockout_end"), "{last}");
    }

    #[tokio::test]
    async fn two_factor_accounts_need_a_code() {
        let mut user = user_with_password("u1", "a@example.com", PASSWORD);
        user.two_factor_enabled = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .into_connection();
        let err = login(&db, &dto(PASSWORD), &test_security(), "127.0.0.1", FIXED_NOW)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: TwoFactorAuthenticationCodeRequired");
    }

    #[tokio::test]
    async fn successful_login_issues_a_session() {
        let user = user_with_password("u1", "a@example.com", PASSWORD);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .append_query_results([vec![role_row("Admin")]])
            .append_query_results([vec![refresh_token_model(1, "u1", "tok", FIXED_NOW)]])
            .append_query_results([vec![login_log_model()]])
            .into_connection();
        let session = login(&db, &dto(PASSWORD), &test_security(), "10.0.0.1", FIXED_NOW)
            .await
            .unwrap();
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.refresh_token, "tok");
        let log = session.login_log.unwrap();
        assert_eq!(log.name, "Admin");
        assert_eq!(log.ip, "10.0.0.1");
    }

    #[tokio::test]
    async fn wrong_totp_code_is_rejected() {
        let mut user = user_with_password("u1", "a@example.com", PASSWORD);
        user.two_factor_enabled = true;
        user.two_factor_secret = Some(totp::new_setup("a@example.com").unwrap().secret);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .into_connection();
        let dto = TwoFactorLoginDto {
            email: "a@example.com".into(),
            password: PASSWORD.into(),
            code: "abc".into(),
            is_portal: false,
        };
        let err = two_factor_login(&db, &dto, &test_security(), "127.0.0.1", FIXED_NOW)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: InvalidTwoFactorAuthenticationCode");
    }

    #[tokio::test]
    async fn passwordless_accounts_cannot_sign_in() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model("u1", "a@example.com")]])
            .append_query_results([vec![user_model("u1", "a@example.com")]])
            .into_connection();
        let err = login(&db, &dto(PASSWORD), &test_security(), "127.0.0.1", FIXED_NOW)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: InvalidEmailOrPassword");
    }
}

//! Access tokens, refresh-token rotation and the login result handed to clients.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::auth::jwt::{mint_access_token, TokenSubject};
use crate::auth::refresh::generate_refresh_token;
use crate::auth::roles::Role;
use crate::error::AppError;
use crate::errors::MessageKey;
use crate::logging::security;
use crate::repos::activity::{self, LoginLogCreate};
use crate::repos::tokens::{self as token_repo, RefreshToken};
use crate::repos::users::{self, User};
use crate::state::SecurityConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginLogDto {
    pub user_id: String,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub login_date: OffsetDateTime,
    pub ip: String,
    pub email: String,
    pub name: String,
}

/// Body returned by every successful sign-in or refresh. The refresh token
/// itself only travels in a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: String,
    pub token: String,
    pub login_log: Option<LoginLogDto>,
    #[serde(skip)]
    pub refresh_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub refresh_token_expiration: OffsetDateTime,
    pub is_phone_number_confirmed: bool,
}

/// Signed access token for `user` carrying `roles`.
pub fn create_token(
    user: &User,
    roles: &[String],
    security: &SecurityConfig,
    now: OffsetDateTime,
) -> Result<String, AppError> {
    let subject = TokenSubject {
        user_id: &user.id,
        email: &user.email,
        user_name: &user.user_name,
        roles,
    };
    Ok(mint_access_token(subject, now, security)?.0)
}

/// Newest active refresh token of the user, or a freshly stored one.
pub async fn refresh_token_for<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    now: OffsetDateTime,
) -> Result<RefreshToken, AppError> {
    if let Some(existing) = token_repo::newest_active_refresh_token(conn, user_id, now).await? {
        debug!(user_id, "reusing active refresh token");
        return Ok(existing);
    }
    let fresh = generate_refresh_token(now);
    Ok(token_repo::store_refresh_token(conn, user_id, &fresh.token, fresh.created_on, fresh.expires_on).await?)
}

/// Name recorded in the login log for a role.
fn login_log_name(role: &str) -> String {
    if role.parse::<Role>() == Ok(Role::Admin) {
        Role::Admin.as_str().to_string()
    } else {
        String::new()
    }
}

/// Complete sign-in for an authenticated user: access token, refresh token
/// and a login-log row stamped with `ip`.
pub async fn issue_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: &User,
    security: &SecurityConfig,
    ip: &str,
    now: OffsetDateTime,
) -> Result<SessionUser, AppError> {
    let roles = users::roles_for_user(conn, &user.id).await?;
    let token = create_token(user, &roles, security, now)?;
    let refresh = refresh_token_for(conn, &user.id, now).await?;

    let role = roles.first().cloned().unwrap_or_default();
    let log = LoginLogCreate {
        user_id: user.id.clone(),
        name: login_log_name(&role),
        role,
        ip_address: ip.to_string(),
        email: user.email.clone(),
    };
    activity::record_login(conn, log.clone(), now).await?;
    info!(user_id = %user.id, ip, "user signed in");

    Ok(SessionUser {
        user_id: user.id.clone(),
        token,
        login_log: Some(LoginLogDto {
            user_id: log.user_id,
            role: log.role,
            login_date: now,
            ip: log.ip_address,
            email: log.email,
            name: log.name,
        }),
        refresh_token: refresh.token,
        refresh_token_expiration: refresh.expires_on,
        is_phone_number_confirmed: user.phone_number_confirmed,
    })
}

/// Exchange an active refresh token for a new one plus a new access token.
/// The presented token is revoked and the user's dead tokens are purged.
pub async fn rotate_refresh_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    presented: &str,
    security: &SecurityConfig,
    now: OffsetDateTime,
) -> Result<SessionUser, AppError> {
    let Some(current) = token_repo::find_refresh_token(conn, presented).await? else {
        security::refresh_token_rejected("unknown_token");
        return Err(AppError::unauthorized(MessageKey::InvalidToken));
    };
    if !current.is_active_at(now) {
        security::refresh_token_rejected("inactive_token");
        return Err(AppError::unauthorized(MessageKey::InactiveToken));
    }

    let user_id = current.user_id.clone();
    token_repo::revoke_refresh_token(conn, current, now).await?;
    let purged = token_repo::purge_inactive_refresh_tokens(conn, &user_id, now).await?;

    let fresh = generate_refresh_token(now);
    let stored =
        token_repo::store_refresh_token(conn, &user_id, &fresh.token, fresh.created_on, fresh.expires_on)
            .await?;

    let user = users::require_user(conn, &user_id).await?;
    let roles = users::roles_for_user(conn, &user_id).await?;
    let token = create_token(&user, &roles, security, now)?;
    debug!(user_id, purged, "refresh token rotated");

    Ok(SessionUser {
        user_id,
        token,
        login_log: None,
        refresh_token: stored.token,
        refresh_token_expiration: stored.expires_on,
        is_phone_number_confirmed: user.phone_number_confirmed,
    })
}

/// Revoke an active refresh token.
pub async fn revoke_refresh_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    presented: Option<&str>,
    now: OffsetDateTime,
) -> Result<(), AppError> {
    let Some(presented) = presented.filter(|t| !t.is_empty()) else {
        return Err(MessageKey::TokenIsRequired.into());
    };
    match token_repo::find_refresh_token(conn, presented).await? {
        Some(token) if token.is_active_at(now) => {
            let user_id = token.user_id.clone();
            token_repo::revoke_refresh_token(conn, token, now).await?;
            info!(user_id, "refresh token revoked");
            Ok(())
        }
        _ => {
            security::refresh_token_rejected("revoke_invalid_token");
            Err(MessageKey::TokenIsInvalid.into())
        }
    }
}

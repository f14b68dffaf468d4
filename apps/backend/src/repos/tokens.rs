//! Refresh tokens and single-use mailed tokens.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::{refresh_tokens_sea, user_tokens_sea};
use crate::entities::refresh_tokens;
use crate::errors::domain::DomainError;

pub type RefreshToken = refresh_tokens::Model;

/// What a mailed token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    EmailConfirmation,
    PasswordReset,
}

impl TokenPurpose {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailConfirmation => "email_confirmation",
            Self::PasswordReset => "password_reset",
        }
    }
}

pub async fn find_refresh_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    token: &str,
) -> Result<Option<RefreshToken>, DomainError> {
    Ok(refresh_tokens_sea::find_by_token(conn, token).await?)
}

pub async fn newest_active_refresh_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    now: OffsetDateTime,
) -> Result<Option<RefreshToken>, DomainError> {
    Ok(refresh_tokens_sea::newest_active_for_user(conn, user_id, now).await?)
}

pub async fn store_refresh_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    token: &str,
    created_on: OffsetDateTime,
    expires_on: OffsetDateTime,
) -> Result<RefreshToken, DomainError> {
    Ok(refresh_tokens_sea::insert_token(conn, user_id, token, created_on, expires_on).await?)
}

pub async fn revoke_refresh_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    token: RefreshToken,
    at: OffsetDateTime,
) -> Result<RefreshToken, DomainError> {
    Ok(refresh_tokens_sea::revoke(conn, token, at).await?)
}

pub async fn purge_inactive_refresh_tokens<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    now: OffsetDateTime,
) -> Result<u64, DomainError> {
    Ok(refresh_tokens_sea::purge_inactive_for_user(conn, user_id, now).await?)
}

pub async fn store_user_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    purpose: TokenPurpose,
    token_hash: &str,
    expires_at: OffsetDateTime,
) -> Result<(), DomainError> {
    user_tokens_sea::insert_token(conn, user_id, purpose.as_str(), token_hash, expires_at).await?;
    Ok(())
}

/// Mark a matching usable token consumed. Returns `false` when none matches.
pub async fn consume_user_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    purpose: TokenPurpose,
    token_hash: &str,
    now: OffsetDateTime,
) -> Result<bool, DomainError> {
    let Some(token) =
        user_tokens_sea::find_usable(conn, user_id, purpose.as_str(), token_hash, now).await?
    else {
        return Ok(false);
    };
    user_tokens_sea::consume(conn, token, now).await?;
    Ok(true)
}

//! One-time password storage.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::otps_sea;
use crate::entities::users_otp;
use crate::errors::domain::DomainError;

pub use otps_sea::OtpCreate;

pub type StoredOtp = users_otp::Model;

pub async fn store_otp<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: OtpCreate,
) -> Result<StoredOtp, DomainError> {
    Ok(otps_sea::insert_otp(conn, dto).await?)
}

pub async fn latest_otp<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<Option<StoredOtp>, DomainError> {
    Ok(otps_sea::latest_for_user(conn, user_id).await?)
}

/// Check `otp` and, when it matches an unexpired entry, delete every OTP of
/// the user. Returns whether it matched.
pub async fn redeem_otp<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    otp: &str,
    now: OffsetDateTime,
) -> Result<bool, DomainError> {
    if otps_sea::find_valid(conn, user_id, otp, now).await?.is_none() {
        return Ok(false);
    }
    otps_sea::delete_for_user(conn, user_id).await?;
    Ok(true)
}

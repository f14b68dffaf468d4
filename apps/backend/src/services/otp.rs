//! Phone one-time passwords.

use rand::Rng;
use sea_orm::ConnectionTrait;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use super::tokens::{issue_session, SessionUser};
use crate::error::AppError;
use crate::errors::MessageKey;
use crate::extractors::validated_json::{required_text, Validate};
use crate::logging::pii::Redacted;
use crate::repos::otps::{self, OtpCreate};
use crate::repos::users::{self, User, UserUpdate};
use crate::state::SecurityConfig;

pub const OTP_LENGTH: usize = 4;
pub const OTP_LIFETIME: Duration = Duration::minutes(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum OtpType {
    #[default]
    Login,
}

impl OtpType {
    pub const fn as_str(self) -> &'static str {
        match self {
            OtpType::Login => "Login",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpDto {
    #[serde(default, alias = "phoneNumber")]
    pub phone: String,
    #[serde(default, alias = "OTP")]
    pub otp: String,
}

impl Validate for VerifyOtpDto {
    fn validate(&self) -> Result<(), String> {
        required_text("Phone", &self.phone, 20)?;
        required_text("Otp", &self.otp, OTP_LENGTH)
    }
}

pub fn generate_otp() -> String {
    let mut rng = rand::rng();
    (0..OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

async fn user_by_phone<C: ConnectionTrait + Send + Sync>(conn: &C, phone: &str) -> Result<User, AppError> {
    users::find_user_by_phone(conn, phone)
        .await?
        .ok_or_else(|| MessageKey::PhoneNotAssociated.into())
}

/// Store a new code for the account behind `phone`. Delivery is by SMS,
/// outside this service; the code is only logged at debug level.
pub async fn send_otp<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    phone: &str,
    otp_type: OtpType,
    ip: &str,
    now: OffsetDateTime,
) -> Result<OffsetDateTime, AppError> {
    let user = user_by_phone(conn, phone).await?;
    let otp = generate_otp();
    let stored = otps::store_otp(
        conn,
        OtpCreate {
            user_id: user.id.clone(),
            otp: otp.clone(),
            otp_type: otp_type.as_str().to_string(),
            ip_address: ip.to_string(),
            created_at: now,
            expires_at: now + OTP_LIFETIME,
        },
    )
    .await?;
    debug!(user_id = %user.id, phone = %Redacted(phone), otp, "otp issued");
    Ok(stored.expires_at)
}

/// Redeem `otp`, confirm the phone number and sign the user in.
pub async fn verify_otp<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    phone: &str,
    otp: &str,
    security: &SecurityConfig,
    ip: &str,
    now: OffsetDateTime,
) -> Result<SessionUser, AppError> {
    let user = user_by_phone(conn, phone).await?;
    if !otps::redeem_otp(conn, &user.id, otp.trim(), now).await? {
        info!(user_id = %user.id, "otp rejected");
        return Err(MessageKey::InvalidOtp.into());
    }

    let user = if user.phone_number_confirmed {
        user
    } else {
        let update = UserUpdate {
            phone_number_confirmed: Some(true),
            ..Default::default()
        };
        users::update_user(conn, &user.id, update).await?
    };
    issue_session(conn, &user, security, ip, now).await
}

/// Expiry of the newest code sent to the account behind `phone`.
pub async fn latest_otp_expiry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    phone: &str,
) -> Result<Option<OffsetDateTime>, AppError> {
    let user = user_by_phone(conn, phone).await?;
    Ok(otps::latest_otp(conn, &user.id).await?.map(|o| o.expires_at))
}

pub async fn is_phone_number_confirmed<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<bool, AppError> {
    Ok(users::require_user(conn, user_id).await?.phone_number_confirmed)
}

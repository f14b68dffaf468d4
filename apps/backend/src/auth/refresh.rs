//! Opaque refresh tokens.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use time::{Duration, OffsetDateTime};

pub const REFRESH_TOKEN_BYTES: usize = 32;
pub const REFRESH_TOKEN_LIFETIME: Duration = Duration::days(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRefreshToken {
    pub token: String,
    pub created_on: OffsetDateTime,
    pub expires_on: OffsetDateTime,
}

/// 32 random bytes, base64 encoded, expiring ten days after `now`.
pub fn generate_refresh_token(now: OffsetDateTime) -> NewRefreshToken {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    NewRefreshToken {
        token: STANDARD.encode(bytes),
        created_on: now,
        expires_on: now + REFRESH_TOKEN_LIFETIME,
    }
}

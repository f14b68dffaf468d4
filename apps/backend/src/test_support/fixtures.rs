//! Entity models for seeding `MockDatabase` results.

use rust_decimal::Decimal;
use time::macros::{date, datetime};
use time::{Duration, OffsetDateTime};

use crate::entities::{products, refresh_tokens, users, users_otp};
use crate::state::SecurityConfig;

/// Fixed instant used as "now" by fixtures.
pub const FIXED_NOW: OffsetDateTime = datetime!(2025-01-15 10:00 UTC);

pub fn test_security() -> SecurityConfig {
    SecurityConfig::new(
        b"fixture_secret_0123456789abcdef0123456789".to_vec(),
        "https://products.test",
        "products-spa",
        1,
    )
}

/// Confirmed, unlocked user without a password.
pub fn user_model(id: &str, email: &str) -> users::Model {
    users::Model {
        id: id.to_string(),
        email: email.to_string(),
        user_name: email.to_string(),
        password_hash: None,
        phone_number: None,
        phone_number_confirmed: false,
        email_confirmed: true,
        two_factor_enabled: false,
        two_factor_secret: None,
        lockout_end: None,
        access_failed_count: 0,
        blocked_from_cash: false,
        google_subject: None,
        created_at: FIXED_NOW,
        updated_at: FIXED_NOW,
    }
}

pub fn user_with_password(id: &str, email: &str, password: &str) -> users::Model {
    let mut user = user_model(id, email);
    user.password_hash = crate::auth::password::hash_password_blocking(password).ok();
    user
}

/// Active token created at `created_on`, expiring ten days later.
pub fn refresh_token_model(
    id: i32,
    user_id: &str,
    token: &str,
    created_on: OffsetDateTime,
) -> refresh_tokens::Model {
    refresh_tokens::Model {
        id,
        user_id: user_id.to_string(),
        token: token.to_string(),
        expires_on: created_on + Duration::days(10),
        created_on,
        revoked_on: None,
    }
}

pub fn otp_model(id: i32, user_id: &str, otp: &str, expires_at: OffsetDateTime) -> users_otp::Model {
    users_otp::Model {
        id,
        user_id: user_id.to_string(),
        otp: otp.to_string(),
        otp_type: "Login".to_string(),
        ip_address: "127.0.0.1".to_string(),
        created_at: expires_at - Duration::minutes(5),
        expires_at,
    }
}

pub fn product_model(id: i32, name: &str, price: i64) -> products::Model {
    products::Model {
        id,
        name: name.to_string(),
        description: format!("{name} description"),
        price: Decimal::from(price),
        created_date: Some(date!(2025 - 01 - 15)),
    }
}

//! Password hashing (argon2id, PHC strings) and the complexity policy.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tokio::task;
use tracing::warn;

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;
const SPECIAL_CHARS: &str = "@$!%*?&";

/// Hash on the calling thread. Request handlers use [`hash_password`].
pub fn hash_password_blocking(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

/// False for a wrong password or an unparseable stored hash.
pub fn verify_password_blocking(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// argon2id on the blocking pool, off the async workers.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|e| AppError::internal(format!("password hashing task failed: {e}")))?
}

pub async fn verify_password(password: &str, stored_hash: &str) -> bool {
    let password = password.to_owned();
    let stored_hash = stored_hash.to_owned();
    match task::spawn_blocking(move || verify_password_blocking(&password, &stored_hash)).await {
        Ok(matches) => matches,
        Err(e) => {
            warn!(error = %e, "password verification task failed");
            false
        }
    }
}

/// At least eight characters with a lowercase letter, an uppercase letter, a
/// digit and one of `@$!%*?&`, and nothing outside those classes.
pub fn meets_policy(password: &str) -> bool {
    let mut lower = false;
    let mut upper = false;
    let mut digit = false;
    let mut special = false;

    for ch in password.chars() {
        match ch {
            'a'..='z' => lower = true,
            'A'..='Z' => upper = true,
            '0'..='9' => digit = true,
            c if SPECIAL_CHARS.contains(c) => special = true,
            _ => return false,
        }
    }

    password.chars().count() >= MIN_PASSWORD_LEN && lower && upper && digit && special
}

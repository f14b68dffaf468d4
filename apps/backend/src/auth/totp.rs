//! Authenticator-app codes: SHA1, six digits, 30 second step, one step of
//! clock skew either way.

use totp_rs::{Algorithm, Secret, TOTP};

use crate::error::AppError;

pub const TOTP_ISSUER: &str = "ProductManagement";
const DIGITS: usize = 6;
const SKEW: u8 = 1;
const STEP_SECS: u64 = 30;

/// A freshly generated secret with its provisioning QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotpSetup {
    /// Base32 secret to store and show for manual entry
    pub secret: String,
    /// PNG QR code of the `otpauth://` URL, base64 encoded
    pub qr_code_png_base64: String,
}

fn totp_for(secret_base32: &str, account: &str) -> Result<TOTP, AppError> {
    let bytes = Secret::Encoded(secret_base32.to_string())
        .to_bytes()
        .map_err(|e| AppError::internal(format!("stored TOTP secret is invalid: {e:?}")))?;
    TOTP::new(
        Algorithm::SHA1,
        DIGITS,
        SKEW,
        STEP_SECS,
        bytes,
        Some(TOTP_ISSUER.to_string()),
        account.to_string(),
    )
    .map_err(|e| AppError::internal(format!("TOTP setup failed: {e}")))
}

pub fn new_setup(account: &str) -> Result<TotpSetup, AppError> {
    let secret = Secret::generate_secret().to_encoded().to_string();
    let qr_code_png_base64 = totp_for(&secret, account)?
        .get_qr_base64()
        .map_err(|e| AppError::internal(format!("QR code generation failed: {e}")))?;
    Ok(TotpSetup {
        secret,
        qr_code_png_base64,
    })
}

/// Check `code` against the current time window.
pub fn verify_code(secret_base32: &str, account: &str, code: &str) -> Result<bool, AppError> {
    let code = code.trim();
    if code.len() != DIGITS || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(false);
    }
    totp_for(secret_base32, account)?
        .check_current(code)
        .map_err(|e| AppError::internal(format!("system clock error: {e}")))
}

//! Account management: sign-in, credentials, two-factor, Google and admin
//! operations on users.

pub mod admin;
pub mod credentials;
pub mod google;
pub mod login;
pub mod two_factor;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde::Deserialize;

use crate::extractors::validated_json::{required_text, Validate};

pub use admin::{
    block_from_cash, blocked_from_cash, change_email, change_password_for, delete_user,
    lock_or_unlock,
};
pub use credentials::{change_password, confirm_email, forgot_password, register, reset_password};
pub use google::{link_account_with_google, login_with_google_portal, register_and_login_with_google, GoogleSignIn};
pub use login::{login, two_factor_login};
pub use two_factor::{enable_two_factor, is_two_factor_enabled, TwoFactorSetupDto};

const EMAIL_MAX: usize = 256;

/// Random URL-safe token for mail links. Only its hash is stored.
pub(crate) fn new_mail_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn hash_mail_token(token: &str) -> String {
    blake3::hash(token.trim().as_bytes()).to_hex().to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginDto {
    fn validate(&self) -> Result<(), String> {
        required_text("Email", &self.email, EMAIL_MAX)?;
        required_text("Password", &self.password, 128)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorLoginDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub code: String,
    /// Portal sign-ins get the `RefreshToken` cookie, dashboard ones the
    /// `DashboardRefreshToken` cookie.
    #[serde(default)]
    pub is_portal: bool,
}

impl Validate for TwoFactorLoginDto {
    fn validate(&self) -> Result<(), String> {
        required_text("Email", &self.email, EMAIL_MAX)?;
        required_text("Password", &self.password, 128)?;
        required_text("Code", &self.code, 10)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Validate for RegisterDto {
    fn validate(&self) -> Result<(), String> {
        required_text("Email", &self.email, EMAIL_MAX)?;
        required_text("Password", &self.password, 128)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmEmailDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub token: String,
}

impl Validate for ConfirmEmailDto {
    fn validate(&self) -> Result<(), String> {
        required_text("Email", &self.email, EMAIL_MAX)?;
        required_text("Token", &self.token, 512)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordDto {
    #[serde(default)]
    pub email: String,
}

impl Validate for ForgotPasswordDto {
    fn validate(&self) -> Result<(), String> {
        required_text("Email", &self.email, EMAIL_MAX)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

impl Validate for ResetPasswordDto {
    fn validate(&self) -> Result<(), String> {
        required_text("Email", &self.email, EMAIL_MAX)?;
        required_text("Token", &self.token, 512)?;
        required_text("NewPassword", &self.new_password, 128)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordDto {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

impl Validate for ChangePasswordDto {
    fn validate(&self) -> Result<(), String> {
        required_text("CurrentPassword", &self.current_password, 128)?;
        required_text("NewPassword", &self.new_password, 128)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmailDto {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub new_email: String,
}

impl Validate for ChangeEmailDto {
    fn validate(&self) -> Result<(), String> {
        required_text("UserId", &self.user_id, 64)?;
        required_text("NewEmail", &self.new_email, EMAIL_MAX)
    }
}

/// Admin password reset, no current password needed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminChangePasswordDto {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub new_password: String,
}

impl Validate for AdminChangePasswordDto {
    fn validate(&self) -> Result<(), String> {
        required_text("UserId", &self.user_id, 64)?;
        required_text("NewPassword", &self.new_password, 128)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockAccountDto {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub lock: bool,
}

impl Validate for LockAccountDto {
    fn validate(&self) -> Result<(), String> {
        required_text("UserId", &self.user_id, 64)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFromCashDto {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub block: bool,
}

impl Validate for BlockFromCashDto {
    fn validate(&self) -> Result<(), String> {
        required_text("UserId", &self.user_id, 64)
    }
}

/// Contact-form message from a site visitor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEmailDto {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub reply_to: String,
}

impl Validate for ContactEmailDto {
    fn validate(&self) -> Result<(), String> {
        required_text("FirstName", &self.first_name, 100)?;
        required_text("Body", &self.body, 4000)?;
        required_text("ReplyTo", &self.reply_to, EMAIL_MAX)
    }
}

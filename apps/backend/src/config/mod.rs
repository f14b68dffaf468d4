//! Environment-driven configuration, read once at startup.

pub mod app;
pub mod auth;
pub mod mail;

use std::env;

pub use app::{runtime_env, AppConfig, RuntimeEnv, ServerSettings};
pub use auth::security_from_env;
pub use mail::{MailProvider, MailSettings};

use crate::error::AppError;

pub(crate) fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}

pub(crate) fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

pub(crate) fn opt_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("Environment variable '{name}' is invalid: '{raw}'"))),
        Err(_) => Ok(default),
    }
}

use super::{must_var, parse_var};
use crate::error::AppError;
use crate::state::SecurityConfig;

const MIN_SECRET_LEN: usize = 32;

/// Token settings from `JWT_SECRET`, `JWT_ISSUER`, `JWT_AUDIENCE` and
/// `JWT_DURATION_HOURS`.
pub fn security_from_env() -> Result<SecurityConfig, AppError> {
    let secret = must_var("JWT_SECRET")?;
    if secret.len() < MIN_SECRET_LEN {
        return Err(AppError::config(format!(
            "JWT_SECRET must be at least {MIN_SECRET_LEN} bytes"
        )));
    }
    let issuer = must_var("JWT_ISSUER")?;
    let audience = must_var("JWT_AUDIENCE")?;
    let duration_hours: i64 = parse_var("JWT_DURATION_HOURS", 1)?;
    if duration_hours <= 0 {
        return Err(AppError::config("JWT_DURATION_HOURS must be positive"));
    }

    Ok(SecurityConfig::new(
        secret.into_bytes(),
        issuer,
        audience,
        duration_hours,
    ))
}

#[cfg(test)]
mod tests {
    use std::env;

    use serial_test::serial;

    use super::security_from_env;

    fn set_env() {
        env::set_var("JWT_SECRET", "0123456789abcdef0123456789abcdef");
        env::set_var("JWT_ISSUER", "https://products.example");
        env::set_var("JWT_AUDIENCE", "products-spa");
    }

    fn clear_env() {
        for key in ["JWT_SECRET", "JWT_ISSUER", "JWT_AUDIENCE", "JWT_DURATION_HOURS"] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn reads_token_settings() {
        set_env();
        env::set_var("JWT_DURATION_HOURS", "3");
        let cfg = security_from_env().unwrap();
        assert_eq!(cfg.issuer, "https://products.example");
        assert_eq!(cfg.audience, "products-spa");
        assert_eq!(cfg.token_duration_hours, 3);
        clear_env();
    }

    #[test]
    #[serial]
    fn short_secret_is_rejected() {
        set_env();
        env::set_var("JWT_SECRET", "short");
        assert!(security_from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn non_positive_duration_is_rejected() {
        set_env();
        env::set_var("JWT_DURATION_HOURS", "0");
        assert!(security_from_env().is_err());
        clear_env();
    }
}

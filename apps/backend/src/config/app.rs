use std::sync::OnceLock;

use tracing::warn;

use super::{opt_var, parse_var, var_or};
use crate::error::AppError;
use crate::state::SecurityConfig;

/// Deployment flavor. Controls log format and how much detail error bodies carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Dev,
    Prod,
}

static RUNTIME_ENV: OnceLock<RuntimeEnv> = OnceLock::new();

impl RuntimeEnv {
    /// `APP_ENV`: `dev`/`development` or `prod`/`production`. Anything else is prod.
    pub fn from_env() -> Self {
        match var_or("APP_ENV", "prod").to_ascii_lowercase().as_str() {
            "dev" | "development" => RuntimeEnv::Dev,
            "prod" | "production" => RuntimeEnv::Prod,
            other => {
                warn!(app_env = other, "unrecognized APP_ENV, using prod");
                RuntimeEnv::Prod
            }
        }
    }

    /// Record the process-wide environment. The first call wins.
    pub fn install(self) -> RuntimeEnv {
        *RUNTIME_ENV.get_or_init(|| self)
    }

    pub fn is_dev(self) -> bool {
        matches!(self, RuntimeEnv::Dev)
    }
}

/// Installed environment, prod when nothing was installed.
pub fn runtime_env() -> RuntimeEnv {
    RUNTIME_ENV.get().copied().unwrap_or(RuntimeEnv::Prod)
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            host: var_or("BACKEND_HOST", "0.0.0.0"),
            port: parse_var("BACKEND_PORT", 3001)?,
        })
    }
}

/// Everything `main` needs to build the application state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: RuntimeEnv,
    pub server: ServerSettings,
    pub security: SecurityConfig,
    pub mail: super::MailSettings,
    pub google_client_id: Option<String>,
}

impl AppConfig {
    pub fn from_env(env: RuntimeEnv) -> Result<Self, AppError> {
        Ok(Self {
            env,
            server: ServerSettings::from_env()?,
            security: super::security_from_env()?,
            mail: super::MailSettings::from_env()?,
            google_client_id: opt_var("GOOGLE_CLIENT_ID"),
        })
    }
}

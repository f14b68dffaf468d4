use std::sync::Arc;

use db_infra::config::db::{DbOwner, DbProfile};
use migration::{migrate, MigrationCommand};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::auth::google::{DisabledGoogleVerifier, GoogleTokenVerifier};
use crate::config::RuntimeEnv;
use crate::error::AppError;
use crate::services::email::{DisabledMailer, EmailSender};
use crate::state::{AppState, SecurityConfig};

enum DbSource {
    Profile(DbProfile),
    Connection(DatabaseConnection),
}

/// Builder for `AppState`, shared by `main` and tests.
pub struct StateBuilder {
    security_config: SecurityConfig,
    env: RuntimeEnv,
    db: Option<DbSource>,
    migrate_on_start: bool,
    mailer: Option<Arc<dyn EmailSender>>,
    google: Option<Arc<dyn GoogleTokenVerifier>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: SecurityConfig::default(),
            env: RuntimeEnv::Prod,
            db: None,
            migrate_on_start: false,
            mailer: None,
            google: None,
        }
    }

    /// Connect with the app role for `profile` during `build`.
    pub fn with_db(mut self, profile: DbProfile) -> Self {
        self.db = Some(DbSource::Profile(profile));
        self
    }

    /// Use an existing connection, typically a `MockDatabase`.
    pub fn with_connection(mut self, conn: DatabaseConnection) -> Self {
        self.db = Some(DbSource::Connection(conn));
        self
    }

    /// Apply pending migrations after connecting.
    pub fn migrate_on_start(mut self, enabled: bool) -> Self {
        self.migrate_on_start = enabled;
        self
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    pub fn with_env(mut self, env: RuntimeEnv) -> Self {
        self.env = env;
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn EmailSender>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn with_google(mut self, google: Arc<dyn GoogleTokenVerifier>) -> Self {
        self.google = Some(google);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let db = match self.db {
            Some(DbSource::Profile(profile)) => {
                let conn = db_infra::connect(profile, DbOwner::App)
                    .await
                    .map_err(|e| AppError::db_unavailable(e.to_string()))?;
                if self.migrate_on_start {
                    info!(profile = ?profile, "applying pending migrations");
                    migrate(&conn, MigrationCommand::Up).await?;
                }
                Some(conn)
            }
            Some(DbSource::Connection(conn)) => Some(conn),
            None => None,
        };

        Ok(AppState::new(
            db,
            self.security_config,
            self.env,
            self.mailer.unwrap_or_else(|| Arc::new(DisabledMailer)),
            self.google
                .unwrap_or_else(|| Arc::new(DisabledGoogleVerifier)),
        ))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

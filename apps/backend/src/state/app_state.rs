use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;
use crate::auth::google::GoogleTokenVerifier;
use crate::config::RuntimeEnv;
use crate::services::cache::CacheService;
use crate::services::email::EmailSender;

/// Shared resources handed to every handler through `web::Data`.
pub struct AppState {
    /// Absent in tests that never touch storage
    db: Option<DatabaseConnection>,
    pub security: SecurityConfig,
    pub env: RuntimeEnv,
    pub cache: CacheService,
    pub mailer: Arc<dyn EmailSender>,
    pub google: Arc<dyn GoogleTokenVerifier>,
}

impl AppState {
    pub fn new(
        db: Option<DatabaseConnection>,
        security: SecurityConfig,
        env: RuntimeEnv,
        mailer: Arc<dyn EmailSender>,
        google: Arc<dyn GoogleTokenVerifier>,
    ) -> Self {
        Self {
            db,
            security,
            env,
            cache: CacheService::new(),
            mailer,
            google,
        }
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }
}

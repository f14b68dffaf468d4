use std::future::Future;
use std::time::Duration;

use migration::{migrate, MigrationCommand};
use rand::Rng;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::{db_url, DbOwner, DbProfile, PoolSettings};
use crate::error::DbInfraError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_INTERVAL_MS: u64 = 500;

async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbInfraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbInfraError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempts = attempt, "connection_retry=success");
                }
                return Ok(result);
            }
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(_) => {
                let jitter = rand::rng().random_range(0..=interval_ms / 4);
                warn!(
                    attempt,
                    max_attempts,
                    interval_ms = interval_ms + jitter,
                    "connection_retry=failed"
                );
                tokio::time::sleep(Duration::from_millis(interval_ms + jitter)).await;
                attempt += 1;
            }
        }
    }
}

/// Open a pooled connection for the given profile and role, retrying while
/// the database comes up.
pub async fn connect(
    profile: DbProfile,
    owner: DbOwner,
) -> Result<DatabaseConnection, DbInfraError> {
    let url = db_url(profile, owner)?;
    let settings = PoolSettings::for_owner(owner)?;

    let mut opt = ConnectOptions::new(&url);
    opt.min_connections(settings.min_connections)
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .sqlx_logging(false);

    info!(
        profile = ?profile,
        owner = ?owner,
        url = %sanitize_db_url(&url),
        max_connections = settings.max_connections,
        "connecting to database"
    );

    retry_connection(
        || {
            let opt = opt.clone();
            async move {
                Database::connect(opt)
                    .await
                    .map_err(|e| DbInfraError::Connect {
                        message: format!("failed to connect to Postgres: {e}"),
                    })
            }
        },
        CONNECT_ATTEMPTS,
        CONNECT_INTERVAL_MS,
    )
    .await
}

/// Mask the password in a connection URL for logging.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((auth_part, host_part)) = url.rsplit_once('@') else {
        return url.to_string();
    };
    let Some((scheme, userinfo)) = auth_part.split_once("://") else {
        return url.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host_part}"),
        None => url.to_string(),
    }
}

/// Connect as the schema owner and run a migration command.
pub async fn orchestrate_migration(
    profile: DbProfile,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    let conn = connect(profile, DbOwner::Owner).await?;
    migrate(&conn, command)
        .await
        .map_err(|e| DbInfraError::Migration {
            message: e.to_string(),
        })
}

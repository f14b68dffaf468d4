use std::env;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::DbInfraError;

/// RFC 3986 userinfo: everything but unreserved characters is escaped.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Which database a connection targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbProfile {
    Prod,
    /// Enforces the `_test` suffix on the database name.
    Test,
}

/// Role used for the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbOwner {
    /// Application role (DML only)
    App,
    /// Schema owner, used for migrations
    Owner,
}

/// Pool sizing for a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl PoolSettings {
    pub fn for_owner(owner: DbOwner) -> Result<Self, DbInfraError> {
        match owner {
            DbOwner::Owner => Ok(Self {
                max_connections: 1,
                min_connections: 1,
                acquire_timeout: Duration::from_secs(2),
            }),
            DbOwner::App => {
                let default_max = (num_cpus::get() as u32 * 4).clamp(4, 32);
                let max_connections = match env::var("DB_MAX_CONNECTIONS") {
                    Ok(raw) => raw.parse::<u32>().map_err(|_| {
                        DbInfraError::config(format!(
                            "DB_MAX_CONNECTIONS must be a positive integer, got '{raw}'"
                        ))
                    })?,
                    Err(_) => default_max,
                };
                Ok(Self {
                    max_connections,
                    min_connections: 1,
                    acquire_timeout: Duration::from_secs(5),
                })
            }
        }
    }
}

/// Builds a Postgres URL from environment variables.
pub fn db_url(profile: DbProfile, owner: DbOwner) -> Result<String, DbInfraError> {
    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
    let db_name = db_name(profile)?;
    let (username, password) = credentials(owner)?;

    let username = utf8_percent_encode(&username, USERINFO);
    let password = utf8_percent_encode(&password, USERINFO);

    Ok(format!(
        "postgresql://{username}:{password}@{host}:{port}/{db_name}"
    ))
}

fn db_name(profile: DbProfile) -> Result<String, DbInfraError> {
    match profile {
        DbProfile::Prod => must_var("PROD_DB"),
        DbProfile::Test => {
            let db_name = must_var("TEST_DB")?;
            if !db_name.ends_with("_test") {
                return Err(DbInfraError::config(format!(
                    "Test profile requires database name to end with '_test', but got: '{db_name}'"
                )));
            }
            Ok(db_name)
        }
    }
}

fn credentials(owner: DbOwner) -> Result<(String, String), DbInfraError> {
    match owner {
        DbOwner::App => Ok((must_var("APP_DB_USER")?, must_var("APP_DB_PASSWORD")?)),
        DbOwner::Owner => Ok((
            must_var("APP_DB_OWNER_USER")?,
            must_var("APP_DB_OWNER_PASSWORD")?,
        )),
    }
}

fn must_var(name: &str) -> Result<String, DbInfraError> {
    env::var(name).map_err(|_| {
        DbInfraError::config(format!("Required environment variable '{name}' is not set"))
    })
}

pub use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;
pub use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseConnection};

mod m20250901_000001_catalog;
mod m20250901_000002_identity;
mod m20250901_000003_lookups;

/// Unique index names. The segment after the last `_` is the column named
/// when the index rejects a duplicate, so it never contains `_` itself.
pub mod unique_indexes {
    pub const USERS_EMAIL: &str = "ux_users_Email";
    pub const USERS_PHONE_NUMBER: &str = "ux_users_PhoneNumber";
    pub const USERS_GOOGLE_SUBJECT: &str = "ux_users_GoogleSubject";
    pub const REFRESH_TOKENS_TOKEN: &str = "ux_refresh_tokens_Token";

    pub const ALL: [&str; 4] = [
        USERS_EMAIL,
        USERS_PHONE_NUMBER,
        USERS_GOOGLE_SUBJECT,
        REFRESH_TOKENS_TOKEN,
    ];
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_catalog::Migration),
            Box::new(m20250901_000002_identity::Migration),
            Box::new(m20250901_000003_lookups::Migration),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationCommand {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

impl std::str::FromStr for MigrationCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "fresh" => Ok(Self::Fresh),
            "reset" => Ok(Self::Reset),
            "refresh" => Ok(Self::Refresh),
            "status" => Ok(Self::Status),
            other => Err(format!(
                "unknown command: {other}. Use: up | down | fresh | reset | refresh | status"
            )),
        }
    }
}

/// Run a migration command against an open connection.
/// Used by the CLI and by backend startup.
pub async fn migrate(db: &DatabaseConnection, command: MigrationCommand) -> Result<(), DbErr> {
    let before = get_db_diagnostics(db).await?;

    tracing::info!(
        cmd = ?command,
        database = %before.name,
        defined = before.defined_migrations_count,
        applied = before.mig_count,
        "migration starting"
    );

    let result = match command {
        MigrationCommand::Up => Migrator::up(db, None).await,
        MigrationCommand::Down => Migrator::down(db, None).await,
        MigrationCommand::Fresh => Migrator::fresh(db).await,
        MigrationCommand::Reset => Migrator::reset(db).await,
        MigrationCommand::Refresh => Migrator::refresh(db).await,
        MigrationCommand::Status => Migrator::status(db).await,
    };

    match result {
        Ok(()) => {
            if !matches!(command, MigrationCommand::Status) {
                let after = get_db_diagnostics(db).await?;
                tracing::info!(
                    cmd = ?command,
                    defined = after.defined_migrations_count,
                    applied = after.mig_count,
                    "migration finished"
                );
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(cmd = ?command, database = %before.name, error = %e, "migration failed");
            Err(e)
        }
    }
}

#[derive(Debug)]
struct DbDiagnostics {
    name: String,
    mig_count: usize,
    defined_migrations_count: usize,
}

async fn get_db_diagnostics(db: &DatabaseConnection) -> Result<DbDiagnostics, DbErr> {
    let stmt = Statement::from_string(
        db.get_database_backend(),
        String::from("select current_database() as name"),
    );
    let name = match db.query_one(stmt).await? {
        Some(row) => row.try_get("", "name")?,
        None => "<unknown>".to_string(),
    };

    Ok(DbDiagnostics {
        name,
        mig_count: count_applied_migrations(db).await.unwrap_or(0),
        defined_migrations_count: Migrator::migrations().len(),
    })
}

/// Number of applied migrations; 0 when the migration table does not exist yet.
pub async fn count_applied_migrations(db: &DatabaseConnection) -> Result<usize, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.len()),
        Err(DbErr::Exec(_)) => Ok(0),
        Err(e) => Err(e),
    }
}

/// Name of the latest applied migration, if any.
pub async fn get_latest_migration_version(
    db: &DatabaseConnection,
) -> Result<Option<String>, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.last().map(|m| m.name().to_string())),
        Err(DbErr::Exec(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::MigrationCommand;

    #[test]
    fn parses_known_commands() {
        assert_eq!("up".parse::<MigrationCommand>(), Ok(MigrationCommand::Up));
        assert_eq!("status".parse::<MigrationCommand>(), Ok(MigrationCommand::Status));
        assert!("sideways".parse::<MigrationCommand>().is_err());
    }

    #[test]
    fn migrations_are_registered_in_order() {
        use super::{MigrationName, Migrator, MigratorTrait};

        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 3);
    }
}

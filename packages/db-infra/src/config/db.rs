use std::env;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::DbInfraError;

/// Runtime environment the connection is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Prod,
    Test,
}

/// Database engine/storage selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

impl DbKind {
    /// Read `DB_KIND` (postgres | sqlite-file | sqlite-memory). Defaults to postgres.
    pub fn from_env() -> Result<Self, DbInfraError> {
        match env::var("DB_KIND").ok().as_deref() {
            None | Some("postgres") => Ok(DbKind::Postgres),
            Some("sqlite-file") => Ok(DbKind::SqliteFile),
            Some("sqlite-memory") => Ok(DbKind::SqliteMemory),
            Some(other) => Err(DbInfraError::Config {
                message: format!(
                    "DB_KIND must be one of postgres | sqlite-file | sqlite-memory, got '{other}'"
                ),
            }),
        }
    }

    pub fn is_sqlite(self) -> bool {
        matches!(self, DbKind::SqliteFile | DbKind::SqliteMemory)
    }
}

/// Database owner enum for different access levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbOwner {
    /// Application-level access (limited permissions)
    App,
    /// Owner-level access (full permissions for migrations)
    Owner,
}

/// Pool sizing and timeouts for a connection
#[derive(Debug, Clone)]
pub struct DbSettings {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

/// Builds the connection string for the given environment, engine, and owner.
pub fn make_conn_spec(
    env: RuntimeEnv,
    db_kind: DbKind,
    owner: DbOwner,
) -> Result<String, DbInfraError> {
    match db_kind {
        DbKind::Postgres => {
            let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
            let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
            let db_name = db_name(env)?;
            let (username, password) = credentials(owner)?;
            let password = utf8_percent_encode(&password, NON_ALPHANUMERIC);
            Ok(format!(
                "postgresql://{username}:{password}@{host}:{port}/{db_name}"
            ))
        }
        DbKind::SqliteFile => {
            let path = env::var("SQLITE_PATH").unwrap_or_else(|_| match env {
                RuntimeEnv::Prod => "./data/cah-engine.db".to_string(),
                RuntimeEnv::Test => "./data/cah-engine-test.db".to_string(),
            });
            Ok(format!("sqlite://{path}?mode=rwc"))
        }
        DbKind::SqliteMemory => Ok("sqlite::memory:".to_string()),
    }
}

/// Pool settings per engine. SQLite is single-writer, and an in-memory
/// database lives only as long as its one connection.
pub fn build_connection_settings(db_kind: DbKind) -> DbSettings {
    match db_kind {
        DbKind::Postgres => DbSettings {
            min_connections: 1,
            max_connections: (num_cpus::get() as u32 * 2).max(4),
            acquire_timeout: Duration::from_secs(5),
        },
        DbKind::SqliteFile | DbKind::SqliteMemory => DbSettings {
            min_connections: 1,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        },
    }
}

/// In-memory databases vanish with the process, so they only make sense for tests.
pub fn validate_db_config(env: RuntimeEnv, db_kind: DbKind) -> Result<(), DbInfraError> {
    if env == RuntimeEnv::Prod && db_kind == DbKind::SqliteMemory {
        return Err(DbInfraError::Config {
            message: "sqlite-memory is not allowed in the prod environment".to_string(),
        });
    }
    Ok(())
}

fn db_name(env: RuntimeEnv) -> Result<String, DbInfraError> {
    match env {
        RuntimeEnv::Prod => must_var("PROD_DB"),
        RuntimeEnv::Test => {
            let db_name = must_var("TEST_DB")?;
            if !db_name.ends_with("_test") {
                return Err(DbInfraError::Config {
                    message: format!(
                        "Test environment requires database name to end with '_test', but got: '{db_name}'"
                    ),
                });
            }
            Ok(db_name)
        }
    }
}

fn credentials(owner: DbOwner) -> Result<(String, String), DbInfraError> {
    match owner {
        DbOwner::App => Ok((must_var("APP_DB_USER")?, must_var("APP_DB_PASSWORD")?)),
        DbOwner::Owner => Ok((must_var("CAH_OWNER_USER")?, must_var("CAH_OWNER_PASSWORD")?)),
    }
}

fn must_var(name: &str) -> Result<String, DbInfraError> {
    env::var(name).map_err(|_| DbInfraError::Config {
        message: format!("{name} must be set"),
    })
}

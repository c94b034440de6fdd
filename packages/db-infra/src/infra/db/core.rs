use std::future::Future;
use std::time::{Duration, Instant};

use migration::{migrate, MigrationCommand, Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::{info, trace, warn};

use crate::config::db::{
    build_connection_settings, make_conn_spec, validate_db_config, DbKind, DbOwner, RuntimeEnv,
};
use crate::error::DbInfraError;

async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbInfraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbInfraError>>,
{
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        "connection_retry=success attempts={} interval_ms={}",
                        attempt, interval_ms
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < max_attempts {
                    warn!(
                        "connection_retry=failed attempt={} max_attempts={} interval_ms={}",
                        attempt, max_attempts, interval_ms
                    );
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| DbInfraError::Connect {
        message: "no error recorded after max attempts".to_string(),
    }))
}

/// Open a pool for the given environment, engine and owner.
///
/// Postgres connections are retried a few times to ride out container start-up.
pub async fn build_pool(
    env: RuntimeEnv,
    db_kind: DbKind,
    owner: DbOwner,
) -> Result<DatabaseConnection, DbInfraError> {
    validate_db_config(env, db_kind)?;

    let url = make_conn_spec(env, db_kind, owner)?;
    let settings = build_connection_settings(db_kind);

    let mut opt = ConnectOptions::new(&url);
    opt.min_connections(settings.min_connections)
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .sqlx_logging(false);

    if db_kind == DbKind::SqliteMemory {
        // the database dies with its connection
        opt.idle_timeout(Duration::from_secs(24 * 60 * 60))
            .max_lifetime(Duration::from_secs(24 * 60 * 60));
    }

    info!(
        env = ?env,
        db_kind = ?db_kind,
        url = %sanitize_db_url(&url),
        max_connections = settings.max_connections,
        "db=connect"
    );

    let connect = || {
        let opt = opt.clone();
        async move {
            Database::connect(opt)
                .await
                .map_err(|e| DbInfraError::Connect {
                    message: format!("failed to connect to {db_kind:?}: {e}"),
                })
        }
    };

    if db_kind == DbKind::Postgres {
        retry_connection(connect, 5, 500).await
    } else {
        connect().await
    }
}

/// Sanitize database URL by masking the password.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((auth_part, host_part)) = url.split_once('@') else {
        return url.to_string();
    };
    match auth_part.rfind(':') {
        Some(colon_pos) if auth_part[..colon_pos].contains("//") => {
            format!("{}:***@{}", &auth_part[..colon_pos], host_part)
        }
        _ => url.to_string(),
    }
}

async fn schema_is_current(conn: &DatabaseConnection) -> Result<bool, DbInfraError> {
    let expected = Migrator::migrations()
        .last()
        .map(|m| m.name().to_string())
        .unwrap_or_default();

    match Migrator::get_applied_migrations(conn).await {
        Ok(applied) => {
            let current = applied.last().map(|m| m.name().to_string());
            trace!(
                applied_count = applied.len(),
                expected_count = Migrator::migrations().len(),
                current_last = %current.as_deref().unwrap_or("None"),
                expected_last = %expected,
                "schema check"
            );
            Ok(applied.len() == Migrator::migrations().len()
                && current.as_deref() == Some(expected.as_str()))
        }
        Err(DbErr::Exec(_)) => Ok(false),
        Err(e) => Err(DbInfraError::Migration {
            message: format!("failed to read applied migrations: {e}"),
        }),
    }
}

/// Connect and bring the schema up to date.
///
/// Used by the backend at boot and by tests (which always get a fresh
/// in-memory database).
pub async fn bootstrap(
    env: RuntimeEnv,
    db_kind: DbKind,
    owner: DbOwner,
) -> Result<DatabaseConnection, DbInfraError> {
    let start = Instant::now();
    let conn = build_pool(env, db_kind, owner).await?;

    if !schema_is_current(&conn).await? {
        migrate(&conn, MigrationCommand::Up)
            .await
            .map_err(|e| DbInfraError::Migration {
                message: format!("migration execution failed: {e}"),
            })?;
    }

    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        db_kind = ?db_kind,
        "db=ready"
    );
    Ok(conn)
}

/// Run an explicit migration command with owner credentials (CLI entry point).
pub async fn orchestrate_migration(
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    info!(env = ?env, db_kind = ?db_kind, command = ?command, "migrate=start");

    let pool = build_pool(env, db_kind, DbOwner::Owner).await?;
    migrate(&pool, command)
        .await
        .map_err(|e| DbInfraError::Migration {
            message: format!("migration execution failed: {e}"),
        })?;

    info!("migrate=done");
    Ok(())
}

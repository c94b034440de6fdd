use db_infra::config::db::DbOwner;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::db::DbProfile;
use crate::error::AppError;

/// Connect for the given profile and bring the schema up to date.
///
/// `DbProfile::Test` always yields a fresh in-memory SQLite database, so every
/// caller gets an isolated store.
pub async fn bootstrap_db(profile: DbProfile) -> Result<DatabaseConnection, AppError> {
    let (env, kind) = profile.resolve()?;
    info!(profile = ?profile, db_kind = ?kind, "bootstrapping database");
    let conn = db_infra::bootstrap(env, kind, DbOwner::App).await?;
    Ok(conn)
}

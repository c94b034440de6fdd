use db_infra::config::db::{DbKind, RuntimeEnv};

use crate::error::AppError;

/// Database profile the backend runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbProfile {
    /// Production database selected by `DB_KIND` (Postgres unless overridden)
    Prod,
    /// Fresh in-memory SQLite database, one per connection pool
    Test,
}

impl DbProfile {
    /// Resolve the profile into the runtime environment and engine to connect to.
    pub fn resolve(self) -> Result<(RuntimeEnv, DbKind), AppError> {
        match self {
            DbProfile::Prod => Ok((RuntimeEnv::Prod, DbKind::from_env()?)),
            DbProfile::Test => Ok((RuntimeEnv::Test, DbKind::SqliteMemory)),
        }
    }
}

//! Shared database configuration and migration infrastructure.
//! Used by the engine backend and the migration CLI.

pub mod config;
pub mod error;
pub mod infra;

pub use config::db;
pub use error::DbInfraError;
pub use infra::db::core::{bootstrap, build_pool, orchestrate_migration};

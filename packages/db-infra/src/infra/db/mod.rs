pub mod core;

pub use core::{bootstrap, build_pool, orchestrate_migration, sanitize_db_url};

#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod entities;
pub mod error;
pub mod errors;
pub mod infra;
pub mod repos;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod ws;


// Re-exports for public API
pub use config::db::DbProfile;
pub use config::game::GameRules;
pub use engine::{CommandOutcome, GameCommand, GameEngine, GameEvent, Notifier, NotifyTarget};
pub use error::AppError;
pub use errors::ErrorCode;
pub use infra::state::build_state;
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}

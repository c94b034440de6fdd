use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::game::GameRules;
use crate::engine::GameEngine;
use crate::ws::hub::SessionRegistry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub rules: GameRules,
    pub engine: Arc<GameEngine>,
    /// Websocket sessions per game; also the engine's notifier in production
    pub registry: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        rules: GameRules,
        engine: Arc<GameEngine>,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            db,
            rules,
            engine,
            registry,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

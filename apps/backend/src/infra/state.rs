use std::sync::Arc;

use crate::config::db::DbProfile;
use crate::config::game::GameRules;
use crate::engine::{GameEngine, Notifier};
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::state::app_state::AppState;
use crate::ws::hub::SessionRegistry;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    db_profile: DbProfile,
    rules: GameRules,
    notifier: Option<Arc<dyn Notifier>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            db_profile: DbProfile::Test,
            rules: GameRules::default(),
            notifier: None,
        }
    }

    pub fn with_db(mut self, profile: DbProfile) -> Self {
        self.db_profile = profile;
        self
    }

    pub fn with_rules(mut self, rules: GameRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the websocket hub as the engine's notifier (tests record
    /// events this way).
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        self.rules.validate()?;
        // single entrypoint: build + migrate
        let db = bootstrap_db(self.db_profile).await?;

        let registry = Arc::new(SessionRegistry::new());
        let notifier = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::clone(&registry) as Arc<dyn Notifier>,
        };
        let engine = GameEngine::new(db.clone(), self.rules, notifier);

        Ok(AppState::new(db, self.rules, engine, registry))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

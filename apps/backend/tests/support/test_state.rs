use std::sync::Arc;
use std::time::Duration;

use cah_engine::config::game::GameRules;
use cah_engine::engine::Notifier;
use cah_engine::infra::state::build_state;
use cah_engine::state::app_state::AppState;
use cah_engine::AppError;

use super::recording::RecordingNotifier;

/// Rules whose deadlines never fire during a test.
pub fn manual_rules() -> GameRules {
    GameRules::default().with_durations(
        Duration::from_secs(600),
        Duration::from_secs(600),
        Duration::from_secs(600),
    )
}

/// Deadlines short enough to watch every timer fire.
pub fn fast_rules() -> GameRules {
    GameRules::default().with_durations(
        Duration::from_millis(150),
        Duration::from_millis(150),
        Duration::from_millis(30),
    )
}

/// Manual drawing and voting, quick cool-down between rounds.
pub fn quick_cooldown_rules() -> GameRules {
    manual_rules().with_durations(
        Duration::from_secs(600),
        Duration::from_secs(600),
        Duration::from_millis(20),
    )
}

/// Fresh in-memory database, with the engine publishing to a recorder.
pub async fn build_test_state(
    rules: GameRules,
) -> Result<(AppState, Arc<RecordingNotifier>), AppError> {
    let recorder = Arc::new(RecordingNotifier::new());
    let state = build_state()
        .with_rules(rules)
        .with_notifier(Arc::clone(&recorder) as Arc<dyn Notifier>)
        .build()
        .await?;
    Ok((state, recorder))
}

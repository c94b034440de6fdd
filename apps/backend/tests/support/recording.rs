use std::sync::Mutex;

use cah_engine::engine::{GameEvent, Notifier, NotifyTarget};

/// Notifier that keeps every event in order.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(NotifyTarget, GameEvent)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(NotifyTarget, GameEvent)> {
        self.events.lock().expect("recorder lock").clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(|(_, e)| e.name()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events()
            .iter()
            .filter(|(_, e)| e.name() == name)
            .count()
    }

    /// Events of one kind, in order.
    pub fn of(&self, name: &str) -> Vec<GameEvent> {
        self.events()
            .into_iter()
            .filter(|(_, e)| e.name() == name)
            .map(|(_, e)| e)
            .collect()
    }

    pub fn last_of(&self, name: &str) -> Option<GameEvent> {
        self.of(name).pop()
    }

    /// Events addressed to one player.
    pub fn for_player(&self, player_id: i64) -> Vec<GameEvent> {
        self.events()
            .into_iter()
            .filter(|(target, _)| {
                matches!(target, NotifyTarget::Player { player_id: p, .. } if *p == player_id)
            })
            .map(|(_, e)| e)
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().expect("recorder lock").clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, target: NotifyTarget, event: GameEvent) {
        self.events.lock().expect("recorder lock").push((target, event));
    }
}

//! Session registry: which websocket sessions watch which game.

use std::sync::Arc;

use actix::prelude::*;
use dashmap::DashMap;
use tracing::{trace, warn};
use uuid::Uuid;

use crate::engine::{GameEvent, Notifier, NotifyTarget};
use crate::ws::protocol::ServerMsg;

/// A serialized frame pushed to a session.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct Push(pub Arc<str>);

struct SessionEntry {
    player_id: i64,
    recipient: Recipient<Push>,
}

#[derive(Default)]
pub struct SessionRegistry {
    games: DashMap<i64, DashMap<Uuid, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, game_id: i64, player_id: i64, recipient: Recipient<Push>) -> Uuid {
        let conn_id = Uuid::new_v4();
        self.games.entry(game_id).or_default().insert(
            conn_id,
            SessionEntry {
                player_id,
                recipient,
            },
        );
        conn_id
    }

    pub fn unregister(&self, game_id: i64, conn_id: Uuid) {
        if let Some(sessions) = self.games.get(&game_id) {
            sessions.remove(&conn_id);
        }
        self.games.remove_if(&game_id, |_, sessions| sessions.is_empty());
    }

    /// Open sessions across all games.
    pub fn session_count(&self) -> usize {
        self.games.iter().map(|sessions| sessions.len()).sum()
    }
}

impl Notifier for SessionRegistry {
    fn notify(&self, target: NotifyTarget, event: GameEvent) {
        let game_id = target.game_id();
        let Some(sessions) = self.games.get(&game_id) else {
            trace!(game_id, event = event.name(), "No sessions for event");
            return;
        };

        let name = event.name();
        let payload: Arc<str> = match serde_json::to_string(&ServerMsg::Event { game_id, event }) {
            Ok(json) => json.into(),
            Err(err) => {
                warn!(game_id, event = name, error = %err, "Failed to serialize event");
                return;
            }
        };

        for session in sessions.iter() {
            if let NotifyTarget::Player { player_id, .. } = target {
                if session.player_id != player_id {
                    continue;
                }
            }
            if let Err(err) = session.recipient.try_send(Push(Arc::clone(&payload))) {
                warn!(
                    game_id,
                    conn_id = %session.key(),
                    event = name,
                    error = %err,
                    "Dropping undeliverable event"
                );
            }
        }
    }
}

//! Per-game timers.
//!
//! At most one timer is armed per game: the drawing deadline, the voting
//! deadline, or the cool-down before the next round. Arming replaces
//! (and cancels) whatever was armed before. State is in-memory only;
//! deadlines live in the `rounds` table and are re-armed by recovery.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    Drawing,
    Voting,
    Cooldown,
}

#[derive(Debug)]
struct TimerSlot {
    round_id: Option<i64>,
    kind: TimerKind,
    token: CancellationToken,
    seq: u64,
}

/// What is armed for a game right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub round_id: Option<i64>,
    pub kind: TimerKind,
}

#[derive(Debug, Clone, Default)]
pub struct RoundTimers {
    slots: Arc<DashMap<i64, TimerSlot>>,
    next_seq: Arc<AtomicU64>,
}

impl RoundTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer for `game_id`, cancelling the previous one.
    ///
    /// When the deadline passes, the slot is removed first and `task` runs
    /// only if the slot still belonged to this timer. A timer that was
    /// replaced or cancelled never runs its task.
    pub fn arm(
        &self,
        game_id: i64,
        round_id: Option<i64>,
        kind: TimerKind,
        deadline: Instant,
        task: BoxFuture<'static, ()>,
    ) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let slot = TimerSlot {
            round_id,
            kind,
            token: token.clone(),
            seq,
        };
        if let Some(previous) = self.slots.insert(game_id, slot) {
            previous.token.cancel();
        }
        debug!(game_id, ?round_id, ?kind, "Timer armed");

        let slots = Arc::clone(&self.slots);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!(game_id, ?kind, "Timer cancelled");
                }
                _ = tokio::time::sleep_until(deadline) => {
                    if slots.remove_if(&game_id, |_, slot| slot.seq == seq).is_some() {
                        debug!(game_id, ?round_id, ?kind, "Timer fired");
                        task.await;
                    }
                }
            }
        });
    }

    /// Cancel the timer of `kind` for `round_id`, if that is what is armed.
    pub fn disarm(&self, game_id: i64, round_id: i64, kind: TimerKind) -> bool {
        match self
            .slots
            .remove_if(&game_id, |_, slot| slot.round_id == Some(round_id) && slot.kind == kind)
        {
            Some((_, slot)) => {
                slot.token.cancel();
                debug!(game_id, round_id, ?kind, "Timer disarmed");
                true
            }
            None => false,
        }
    }

    /// Drop all timer state of a game.
    pub fn forget_game(&self, game_id: i64) {
        if let Some((_, slot)) = self.slots.remove(&game_id) {
            slot.token.cancel();
            debug!(game_id, kind = ?slot.kind, "Timer state dropped");
        }
    }

    pub fn armed(&self, game_id: i64) -> Option<ArmedTimer> {
        self.slots.get(&game_id).map(|slot| ArmedTimer {
            round_id: slot.round_id,
            kind: slot.kind,
        })
    }

    /// Number of games with an armed timer.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

//! Notification boundary: the engine publishes, transports deliver.
//!
//! Publishing is synchronous and fire-and-forget. A notifier must never
//! block or fail the caller; undeliverable events are logged and dropped.

use serde::Serialize;

use crate::repos::decks::AnswerCard;
use crate::services::games::RoundView;

/// Who receives an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyTarget {
    /// Everyone connected to the game.
    Game(i64),
    /// One player's connections.
    Player { game_id: i64, player_id: i64 },
}

impl NotifyTarget {
    pub fn game_id(&self) -> i64 {
        match self {
            NotifyTarget::Game(game_id) | NotifyTarget::Player { game_id, .. } => *game_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Timeout,
    AllPlayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Voting opened with nothing to vote on.
    NoPicks,
    /// The judge did not vote in time.
    VotingTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEndReason {
    WinThreshold,
    NoPromptsLeft,
    NotEnoughPlayers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerPoints {
    pub player_id: i64,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    RoundStarted {
        round: RoundView,
    },
    /// Sent to one player: their full hand after dealing.
    HandDealt {
        round_id: i64,
        new_card_ids: Vec<i64>,
        hand: Vec<AnswerCard>,
    },
    PickSubmitted {
        round_id: i64,
        player_id: i64,
        submitted: usize,
        expected: usize,
    },
    /// Drawing closed; `round.picks` are up for the vote.
    RoundEnded {
        reason: EndReason,
        round: RoundView,
    },
    RoundResolved {
        round_id: i64,
        round_no: i32,
        round_pick_id: i64,
        winner_player_id: i64,
        points: Vec<PlayerPoints>,
    },
    RoundSkipped {
        round_id: i64,
        reason: SkipReason,
    },
    GameEnded {
        winner_player_id: Option<i64>,
        reason: GameEndReason,
    },
    Error {
        code: String,
        message: String,
    },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::RoundStarted { .. } => "round_started",
            GameEvent::HandDealt { .. } => "hand_dealt",
            GameEvent::PickSubmitted { .. } => "pick_submitted",
            GameEvent::RoundEnded { .. } => "round_ended",
            GameEvent::RoundResolved { .. } => "round_resolved",
            GameEvent::RoundSkipped { .. } => "round_skipped",
            GameEvent::GameEnded { .. } => "game_ended",
            GameEvent::Error { .. } => "error",
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, target: NotifyTarget, event: GameEvent);
}

//! Tagged commands: every trigger into a game goes through
//! [`super::GameEngine::dispatch`].

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    /// Open round 1 of a game created by the lobby layer.
    StartGame { game_id: i64 },
    SubmitPick {
        round_id: i64,
        player_id: i64,
        answer_card_ids: Vec<i64>,
    },
    CastVote {
        judge_player_id: i64,
        round_pick_id: i64,
    },
    /// The lobby layer reports a player gone.
    PlayerLeft { player_id: i64 },
    /// Drawing deadline reached.
    DrawingTimeout { game_id: i64, round_id: i64 },
    /// Voting deadline reached without a vote.
    VotingTimeout { game_id: i64, round_id: i64 },
    /// Cool-down after a round elapsed.
    NextRound { game_id: i64 },
}

impl GameCommand {
    pub fn name(&self) -> &'static str {
        match self {
            GameCommand::StartGame { .. } => "start_game",
            GameCommand::SubmitPick { .. } => "submit_pick",
            GameCommand::CastVote { .. } => "cast_vote",
            GameCommand::PlayerLeft { .. } => "player_left",
            GameCommand::DrawingTimeout { .. } => "drawing_timeout",
            GameCommand::VotingTimeout { .. } => "voting_timeout",
            GameCommand::NextRound { .. } => "next_round",
        }
    }
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    RoundStarted {
        game_id: i64,
        round_id: i64,
        round_no: i32,
    },
    PickAccepted {
        round_id: i64,
        round_pick_id: i64,
        /// This pick was the last one and moved the round to voting.
        voting_started: bool,
    },
    VotingStarted { round_id: i64 },
    RoundResolved {
        round_id: i64,
        winner_player_id: i64,
        game_winner_player_id: Option<i64>,
    },
    /// Ended without a winner: no picks, or the judge never voted.
    RoundClosed { round_id: i64 },
    GameEnded {
        game_id: i64,
        winner_player_id: Option<i64>,
    },
    PlayerDeactivated { player_id: i64 },
    /// A stale or duplicate trigger; nothing changed.
    Ignored,
}

//! Win Evaluator: runs right after a round is resolved.

use std::collections::BTreeMap;

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use tracing::info;

use crate::domain::{tally_wins, winner_at_threshold};
use crate::error::AppError;
use crate::repos::{games, rounds};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameOutcome {
    /// Nobody reached the threshold yet.
    Continue { tally: BTreeMap<i64, u32> },
    /// The game was marked ENDED with this winner.
    Ended {
        winner_player_id: i64,
        tally: BTreeMap<i64, u32>,
    },
}

impl GameOutcome {
    pub fn tally(&self) -> &BTreeMap<i64, u32> {
        match self {
            GameOutcome::Continue { tally } | GameOutcome::Ended { tally, .. } => tally,
        }
    }
}

/// Round wins per player across the game's ended rounds.
pub async fn tally<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<BTreeMap<i64, u32>, AppError> {
    let winners = rounds::find_winners_by_game(conn, game_id).await?;
    Ok(tally_wins(&winners))
}

/// Tally wins and end the game if someone reached `win_threshold`.
pub async fn evaluate<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    win_threshold: u32,
    now: OffsetDateTime,
) -> Result<GameOutcome, AppError> {
    let tally = tally(conn, game_id).await?;

    let Some(winner_player_id) = winner_at_threshold(&tally, win_threshold) else {
        return Ok(GameOutcome::Continue { tally });
    };

    if games::end_game(conn, game_id, Some(winner_player_id), now).await? {
        info!(game_id, winner_player_id, "Game won");
    }
    Ok(GameOutcome::Ended {
        winner_player_id,
        tally,
    })
}

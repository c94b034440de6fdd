//! Judge Rotation Selector: loads judging history and defers the choice
//! to [`crate::domain::judge`].

use std::collections::HashMap;

use sea_orm::ConnectionTrait;

use crate::domain::{round_rng, select_next_judge as pick_judge, JudgeHistory, SeedPurpose};
use crate::error::AppError;
use crate::repos::{players, rounds};

/// Judging history of every active player of the game, in join order.
pub async fn judge_histories<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<JudgeHistory>, AppError> {
    let active = players::find_active_by_game(conn, game_id).await?;
    let rounds = rounds::find_all_by_game(conn, game_id).await?;

    let mut last_judged: HashMap<i64, i32> = HashMap::new();
    for round in &rounds {
        let entry = last_judged.entry(round.judge_player_id).or_insert(round.round_no);
        *entry = (*entry).max(round.round_no);
    }

    Ok(active
        .iter()
        .map(|p| JudgeHistory {
            player_id: p.id,
            last_judged_round: last_judged.get(&p.id).copied(),
        })
        .collect())
}

/// Choose the judge of round `round_no`.
///
/// Fails with an invariant violation when the game has no active players.
pub async fn select_next_judge<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    game_seed: i64,
    round_no: i32,
) -> Result<i64, AppError> {
    let histories = judge_histories(conn, game_id).await?;
    let mut rng = round_rng(game_seed, round_no, SeedPurpose::Judge);
    Ok(pick_judge(&histories, &mut rng)?)
}

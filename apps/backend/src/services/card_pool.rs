//! Card Pool Allocator.
//!
//! Answer cards of a game are partitioned into the undealt pool, cards held
//! in hands, and played cards. Dealing moves cards from the pool into hands,
//! submitting moves them from a hand to played. Nothing ever returns to the
//! pool.

use std::collections::BTreeMap;

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::domain::{assign_round_robin, round_rng, sample_without_replacement, SeedPurpose};
use crate::error::AppError;
use crate::errors::domain::{DomainError, PoolKind};
use crate::repos::decks::{self, AnswerCard};
use crate::repos::hands;

/// What to do when the pool cannot cover every need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortfallPolicy {
    /// Fail with `PoolExhausted` and deal nothing.
    Fail,
    /// Deal what is left, spread evenly, and report the shortfall.
    DealAvailable,
}

/// Outcome of a replenishment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dealt {
    /// New card ids per player. Every player that was asked for appears.
    pub by_player: BTreeMap<i64, Vec<i64>>,
    /// Cards that were needed but not available.
    pub shortfall: usize,
}

impl Dealt {
    pub fn total(&self) -> usize {
        self.by_player.values().map(Vec::len).sum()
    }
}

/// Snapshot of the three disjoint card states of a game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPartition {
    pub pool: Vec<i64>,
    pub held: Vec<i64>,
    pub played: Vec<i64>,
    /// Every answer card of the game's decks.
    pub all: Vec<i64>,
}

/// How many cards each player is missing to reach `hand_size`.
pub async fn needs_for<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    player_ids: &[i64],
    hand_size: usize,
) -> Result<Vec<(i64, usize)>, AppError> {
    let sizes = hands::sizes_by_player(conn, game_id).await?;
    Ok(player_ids
        .iter()
        .map(|player_id| {
            let held = sizes.get(player_id).copied().unwrap_or(0);
            (*player_id, hand_size.saturating_sub(held))
        })
        .collect())
}

/// Deal new cards to players from the game's undealt pool.
///
/// The candidate read and the inserts must share `conn`'s transaction so a
/// concurrent deal cannot hand out the same card; the unique index on
/// `(game_id, answer_card_id)` rejects it if one tries.
pub async fn replenish_hands<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    game_seed: i64,
    round_no: i32,
    needs: &[(i64, usize)],
    policy: ShortfallPolicy,
    now: OffsetDateTime,
) -> Result<Dealt, AppError> {
    let required: usize = needs.iter().map(|(_, n)| *n).sum();
    if required == 0 {
        return Ok(Dealt {
            by_player: needs.iter().map(|(p, _)| (*p, Vec::new())).collect(),
            shortfall: 0,
        });
    }

    let pool = decks::find_pool_answer_ids(conn, game_id).await?;
    let shortfall = required.saturating_sub(pool.len());
    if shortfall > 0 {
        if policy == ShortfallPolicy::Fail {
            return Err(DomainError::pool_exhausted(
                PoolKind::AnswerCards,
                format!(
                    "game {game_id} needs {required} answer cards, {} left",
                    pool.len()
                ),
            )
            .into());
        }
        warn!(
            game_id,
            round_no,
            required,
            available = pool.len(),
            "Answer pool exhausted, dealing short hands"
        );
    }

    let mut rng = round_rng(game_seed, round_no, SeedPurpose::Deal);
    let drawn = sample_without_replacement(&pool, required, &mut rng);
    let by_player = assign_round_robin(&drawn, needs);

    hands::insert_deal(conn, game_id, &by_player, now).await?;

    debug!(game_id, round_no, dealt = drawn.len(), shortfall, "Hands replenished");
    Ok(Dealt {
        by_player,
        shortfall,
    })
}

/// A player's current hand with card text.
pub async fn hand_of<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Vec<AnswerCard>, AppError> {
    let ids = hands::card_ids_of(conn, player_id).await?;
    Ok(decks::find_answer_cards(conn, &ids).await?)
}

/// Read the pool/held/played partition of a game.
pub async fn partition<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<CardPartition, AppError> {
    let mut held = hands::held_ids_by_game(conn, game_id).await?;
    held.sort_unstable();
    Ok(CardPartition {
        pool: decks::find_pool_answer_ids(conn, game_id).await?,
        held,
        played: decks::find_played_answer_ids(conn, game_id).await?,
        all: decks::find_game_answer_ids(conn, game_id).await?,
    })
}

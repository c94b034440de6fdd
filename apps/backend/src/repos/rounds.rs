//! Round repository functions.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::rounds_sea as rounds_adapter;
use crate::entities::rounds::{self, RoundStatus};
use crate::errors::domain::{DomainError, NotFoundKind};

/// Round domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub id: i64,
    pub game_id: i64,
    pub round_no: i32,
    pub status: RoundStatus,
    pub judge_player_id: i64,
    pub prompt_card_id: i64,
    pub winner_player_id: Option<i64>,
    pub created_at: OffsetDateTime,
    /// End of the drawing phase. Once voting starts this is the moment
    /// drawing actually closed.
    pub ends_at: OffsetDateTime,
    pub voting_ends_at: Option<OffsetDateTime>,
    pub ended_at: Option<OffsetDateTime>,
}

impl From<rounds::Model> for Round {
    fn from(model: rounds::Model) -> Self {
        Self {
            id: model.id,
            game_id: model.game_id,
            round_no: model.round_no,
            status: model.status,
            judge_player_id: model.judge_player_id,
            prompt_card_id: model.prompt_card_id,
            winner_player_id: model.winner_player_id,
            created_at: model.created_at,
            ends_at: model.ends_at,
            voting_ends_at: model.voting_ends_at,
            ended_at: model.ended_at,
        }
    }
}

pub async fn create_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: rounds_adapter::RoundCreate,
) -> Result<Round, DomainError> {
    let round = rounds_adapter::create_round(conn, dto).await?;
    Ok(Round::from(round))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Option<Round>, DomainError> {
    let round = rounds_adapter::find_by_id(conn, round_id).await?;
    Ok(round.map(Round::from))
}

/// Find round by ID or return `NotFound`.
pub async fn require_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Round, DomainError> {
    find_by_id(conn, round_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Round, format!("Round {round_id} not found"))
    })
}

pub async fn find_latest_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<Round>, DomainError> {
    let round = rounds_adapter::find_latest_by_game(conn, game_id).await?;
    Ok(round.map(Round::from))
}

pub async fn find_all_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<Round>, DomainError> {
    let rounds = rounds_adapter::find_all_by_game(conn, game_id).await?;
    Ok(rounds.into_iter().map(Round::from).collect())
}

/// The one round of a game that is not ENDED, if any. More than one open
/// round is a broken invariant.
pub async fn find_open_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<Round>, DomainError> {
    let mut open = rounds_adapter::find_open_by_game(conn, game_id).await?;
    if open.len() > 1 {
        return Err(DomainError::invariant(format!(
            "game {game_id} has {} open rounds",
            open.len()
        )));
    }
    Ok(open.pop().map(Round::from))
}

pub async fn find_winners_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<i64>, DomainError> {
    Ok(rounds_adapter::find_winners_by_game(conn, game_id).await?)
}

/// Returns `false` if the round was no longer in DRAWING_CARDS.
pub async fn mark_voting<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    now: OffsetDateTime,
    voting_ends_at: OffsetDateTime,
) -> Result<bool, DomainError> {
    let rows = rounds_adapter::mark_voting(
        conn,
        rounds_adapter::RoundVoting {
            round_id,
            now,
            voting_ends_at,
        },
    )
    .await?;
    Ok(rows > 0)
}

/// Returns `false` if the round was no longer in CZAR_VOTING.
pub async fn mark_ended<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    winner_player_id: Option<i64>,
    now: OffsetDateTime,
) -> Result<bool, DomainError> {
    let rows = rounds_adapter::mark_ended(
        conn,
        rounds_adapter::RoundEnd {
            round_id,
            winner_player_id,
            now,
        },
    )
    .await?;
    Ok(rows > 0)
}

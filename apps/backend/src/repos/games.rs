//! Game repository functions for domain layer.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::games_sea as games_adapter;
use crate::entities::games::{self, GameStatus};
use crate::errors::domain::{DomainError, NotFoundKind};

/// Game domain model, converted from `games::Model` when loaded through the
/// repo functions.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: i64,
    pub room_id: i64,
    pub status: GameStatus,
    pub rng_seed: i64,
    pub winner_player_id: Option<i64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub ended_at: Option<OffsetDateTime>,
}

impl Game {
    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }
}

impl From<games::Model> for Game {
    fn from(model: games::Model) -> Self {
        Self {
            id: model.id,
            room_id: model.room_id,
            status: model.status,
            rng_seed: model.rng_seed,
            winner_player_id: model.winner_player_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            ended_at: model.ended_at,
        }
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<Game>, DomainError> {
    let game = games_adapter::find_by_id(conn, game_id).await?;
    Ok(game.map(Game::from))
}

/// Find game by ID or return `NotFound`.
pub async fn require_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Game, DomainError> {
    find_by_id(conn, game_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Game, format!("Game {game_id} not found"))
    })
}

/// Ids of every game still PLAYING, oldest first.
pub async fn find_playing_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<i64>, DomainError> {
    let games = games_adapter::find_by_status(conn, GameStatus::Playing).await?;
    Ok(games.into_iter().map(|g| g.id).collect())
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: i64,
    rng_seed: i64,
) -> Result<Game, DomainError> {
    let game =
        games_adapter::create_game(conn, games_adapter::GameCreate { room_id, rng_seed }).await?;
    Ok(Game::from(game))
}

/// PLAYING -> ENDED. Returns `false` when the game had already ended.
pub async fn end_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    winner_player_id: Option<i64>,
    now: OffsetDateTime,
) -> Result<bool, DomainError> {
    let rows = games_adapter::end_game(
        conn,
        games_adapter::GameEnd {
            game_id,
            winner_player_id,
            ended_at: now,
        },
    )
    .await?;
    Ok(rows > 0)
}

//! Player repository functions for domain layer (generic over ConnectionTrait).

use sea_orm::ConnectionTrait;

use crate::adapters::players_sea as players_adapter;
use crate::entities::players;
use crate::errors::domain::{DomainError, NotFoundKind};

/// A room member seated in one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: i64,
    pub game_id: i64,
    pub room_user_id: i64,
    pub display_name: String,
    pub is_active: bool,
}

impl From<players::Model> for Player {
    fn from(model: players::Model) -> Self {
        Self {
            id: model.id,
            game_id: model.game_id,
            room_user_id: model.room_user_id,
            display_name: model.display_name,
            is_active: model.is_active,
        }
    }
}

pub async fn create_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    room_user_id: i64,
    display_name: &str,
) -> Result<Player, DomainError> {
    let player = players_adapter::create_player(
        conn,
        players_adapter::PlayerCreate {
            game_id,
            room_user_id,
            display_name: display_name.to_string(),
        },
    )
    .await?;
    Ok(Player::from(player))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Option<Player>, DomainError> {
    let player = players_adapter::find_by_id(conn, player_id).await?;
    Ok(player.map(Player::from))
}

/// Find player by ID or return `NotFound`.
pub async fn require_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Player, DomainError> {
    find_by_id(conn, player_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Player, format!("Player {player_id} not found"))
    })
}

pub async fn find_all_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<Player>, DomainError> {
    let players = players_adapter::find_all_by_game(conn, game_id).await?;
    Ok(players.into_iter().map(Player::from).collect())
}

pub async fn find_active_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<Player>, DomainError> {
    let players = players_adapter::find_active_by_game(conn, game_id).await?;
    Ok(players.into_iter().map(Player::from).collect())
}

/// Returns `false` when the player does not exist.
pub async fn set_active<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    is_active: bool,
) -> Result<bool, DomainError> {
    let rows = players_adapter::set_active(conn, player_id, is_active).await?;
    Ok(rows > 0)
}

//! DTOs for players_sea adapter.

/// DTO for seating a room member in a game.
#[derive(Debug, Clone)]
pub struct PlayerCreate {
    pub game_id: i64,
    pub room_user_id: i64,
    pub display_name: String,
}

//! DTOs for games_sea adapter.

use time::OffsetDateTime;

/// DTO for creating a game.
#[derive(Debug, Clone)]
pub struct GameCreate {
    pub room_id: i64,
    pub rng_seed: i64,
}

/// DTO for ending a game that is still PLAYING.
#[derive(Debug, Clone)]
pub struct GameEnd {
    pub game_id: i64,
    pub winner_player_id: Option<i64>,
    pub ended_at: OffsetDateTime,
}

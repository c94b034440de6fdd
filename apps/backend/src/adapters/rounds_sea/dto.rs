//! DTOs for rounds_sea adapter.

use time::OffsetDateTime;

/// DTO for opening a round in DRAWING_CARDS.
#[derive(Debug, Clone)]
pub struct RoundCreate {
    pub game_id: i64,
    pub round_no: i32,
    pub judge_player_id: i64,
    pub prompt_card_id: i64,
    pub created_at: OffsetDateTime,
    pub ends_at: OffsetDateTime,
}

/// DTO for DRAWING_CARDS -> CZAR_VOTING.
#[derive(Debug, Clone, Copy)]
pub struct RoundVoting {
    pub round_id: i64,
    pub now: OffsetDateTime,
    pub voting_ends_at: OffsetDateTime,
}

/// DTO for CZAR_VOTING -> ENDED.
#[derive(Debug, Clone, Copy)]
pub struct RoundEnd {
    pub round_id: i64,
    pub winner_player_id: Option<i64>,
    pub now: OffsetDateTime,
}

//! DTOs for hands_sea adapter.

use time::OffsetDateTime;

/// One dealt card.
#[derive(Debug, Clone, Copy)]
pub struct HandCardCreate {
    pub player_id: i64,
    pub answer_card_id: i64,
}

/// A batch of cards dealt to a game's players at once.
#[derive(Debug, Clone)]
pub struct DealCreate {
    pub game_id: i64,
    pub dealt_at: OffsetDateTime,
    pub cards: Vec<HandCardCreate>,
}

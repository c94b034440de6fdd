//! DTOs for picks_sea adapter.

/// DTO for recording a player's submission.
#[derive(Debug, Clone)]
pub struct PickCreate {
    pub game_id: i64,
    pub round_id: i64,
    pub player_id: i64,
    /// Cards in submission order.
    pub answer_card_ids: Vec<i64>,
}

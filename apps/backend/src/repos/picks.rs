//! Round pick repository functions.

use std::collections::HashMap;

use sea_orm::ConnectionTrait;

use crate::adapters::picks_sea as picks_adapter;
use crate::entities::round_picks;
use crate::errors::domain::{DomainError, NotFoundKind};

/// A player's submission for a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundPick {
    pub id: i64,
    pub round_id: i64,
    pub player_id: i64,
    pub is_winner: bool,
    /// Answer card ids in submission order.
    pub answer_card_ids: Vec<i64>,
}

impl RoundPick {
    fn from_model(model: round_picks::Model, answer_card_ids: Vec<i64>) -> Self {
        Self {
            id: model.id,
            round_id: model.round_id,
            player_id: model.player_id,
            is_winner: model.is_winner,
            answer_card_ids,
        }
    }
}

pub async fn create_pick<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    round_id: i64,
    player_id: i64,
    answer_card_ids: &[i64],
) -> Result<RoundPick, DomainError> {
    let model = picks_adapter::create_pick(
        conn,
        picks_adapter::PickCreate {
            game_id,
            round_id,
            player_id,
            answer_card_ids: answer_card_ids.to_vec(),
        },
    )
    .await?;
    Ok(RoundPick::from_model(model, answer_card_ids.to_vec()))
}

/// Find a pick (with cards) or return `NotFound`.
pub async fn require_pick<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_pick_id: i64,
) -> Result<RoundPick, DomainError> {
    let Some(model) = picks_adapter::find_by_id(conn, round_pick_id).await? else {
        return Err(DomainError::not_found(
            NotFoundKind::Pick,
            format!("Pick {round_pick_id} not found"),
        ));
    };
    let cards = picks_adapter::find_cards_for_picks(conn, &[model.id]).await?;
    let ids = cards.into_iter().map(|c| c.answer_card_id).collect();
    Ok(RoundPick::from_model(model, ids))
}

/// All picks of a round with their cards, in submission order.
pub async fn find_by_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<RoundPick>, DomainError> {
    let models = picks_adapter::find_by_round(conn, round_id).await?;
    let pick_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
    let cards = picks_adapter::find_cards_for_picks(conn, &pick_ids).await?;

    let mut by_pick: HashMap<i64, Vec<i64>> = HashMap::new();
    for card in cards {
        by_pick
            .entry(card.round_pick_id)
            .or_default()
            .push(card.answer_card_id);
    }

    Ok(models
        .into_iter()
        .map(|m| {
            let ids = by_pick.remove(&m.id).unwrap_or_default();
            RoundPick::from_model(m, ids)
        })
        .collect())
}

/// Ids of players who have submitted for the round.
pub async fn submitted_player_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<i64>, DomainError> {
    let models = picks_adapter::find_by_round(conn, round_id).await?;
    Ok(models.into_iter().map(|m| m.player_id).collect())
}

pub async fn has_submitted<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    player_id: i64,
) -> Result<bool, DomainError> {
    Ok(picks_adapter::find_by_round_and_player(conn, round_id, player_id)
        .await?
        .is_some())
}

pub async fn mark_winner<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_pick_id: i64,
) -> Result<(), DomainError> {
    let rows = picks_adapter::mark_winner(conn, round_pick_id).await?;
    if rows == 0 {
        return Err(DomainError::invariant(format!(
            "winning pick {round_pick_id} vanished"
        )));
    }
    Ok(())
}

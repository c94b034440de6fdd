//! SeaORM adapter for held cards - generic over ConnectionTrait.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder, Set};

use crate::entities::hand_cards;

pub mod dto;

pub use dto::{DealCreate, HandCardCreate};

/// Insert all dealt cards in one statement.
pub async fn insert_deal<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: DealCreate,
) -> Result<(), sea_orm::DbErr> {
    if dto.cards.is_empty() {
        return Ok(());
    }

    let rows = dto.cards.into_iter().map(|card| hand_cards::ActiveModel {
        id: NotSet,
        game_id: Set(dto.game_id),
        player_id: Set(card.player_id),
        answer_card_id: Set(card.answer_card_id),
        dealt_at: Set(dto.dealt_at),
    });

    hand_cards::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Cards held by one player, in dealing order.
pub async fn find_by_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Vec<hand_cards::Model>, sea_orm::DbErr> {
    hand_cards::Entity::find()
        .filter(hand_cards::Column::PlayerId.eq(player_id))
        .order_by_asc(hand_cards::Column::Id)
        .all(conn)
        .await
}

/// Every held card of a game.
pub async fn find_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<hand_cards::Model>, sea_orm::DbErr> {
    hand_cards::Entity::find()
        .filter(hand_cards::Column::GameId.eq(game_id))
        .order_by_asc(hand_cards::Column::Id)
        .all(conn)
        .await
}

/// Remove the given cards from a player's hand. Returns rows deleted.
pub async fn remove_cards<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    answer_card_ids: &[i64],
) -> Result<u64, sea_orm::DbErr> {
    if answer_card_ids.is_empty() {
        return Ok(0);
    }
    let result = hand_cards::Entity::delete_many()
        .filter(hand_cards::Column::PlayerId.eq(player_id))
        .filter(hand_cards::Column::AnswerCardId.is_in(answer_card_ids.iter().copied()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

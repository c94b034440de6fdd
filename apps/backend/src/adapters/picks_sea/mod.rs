//! SeaORM adapter for round picks and their cards.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::{pick_cards, round_picks};

pub mod dto;

pub use dto::PickCreate;

/// Insert the pick row and one `pick_cards` row per card, keeping order.
pub async fn create_pick<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PickCreate,
) -> Result<round_picks::Model, sea_orm::DbErr> {
    let pick = round_picks::ActiveModel {
        id: NotSet,
        round_id: Set(dto.round_id),
        player_id: Set(dto.player_id),
        is_winner: Set(false),
        created_at: Set(time::OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await?;

    if !dto.answer_card_ids.is_empty() {
        let rows = dto
            .answer_card_ids
            .iter()
            .enumerate()
            .map(|(position, card_id)| pick_cards::ActiveModel {
                id: NotSet,
                game_id: Set(dto.game_id),
                round_pick_id: Set(pick.id),
                answer_card_id: Set(*card_id),
                position: Set(position as i16),
            });
        pick_cards::Entity::insert_many(rows)
            .exec_without_returning(conn)
            .await?;
    }

    Ok(pick)
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_pick_id: i64,
) -> Result<Option<round_picks::Model>, sea_orm::DbErr> {
    round_picks::Entity::find_by_id(round_pick_id).one(conn).await
}

/// Picks of a round in submission order.
pub async fn find_by_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<round_picks::Model>, sea_orm::DbErr> {
    round_picks::Entity::find()
        .filter(round_picks::Column::RoundId.eq(round_id))
        .order_by_asc(round_picks::Column::Id)
        .all(conn)
        .await
}

pub async fn find_by_round_and_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    player_id: i64,
) -> Result<Option<round_picks::Model>, sea_orm::DbErr> {
    round_picks::Entity::find()
        .filter(round_picks::Column::RoundId.eq(round_id))
        .filter(round_picks::Column::PlayerId.eq(player_id))
        .one(conn)
        .await
}

/// Cards of the given picks, ordered by pick then position.
pub async fn find_cards_for_picks<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_pick_ids: &[i64],
) -> Result<Vec<pick_cards::Model>, sea_orm::DbErr> {
    if round_pick_ids.is_empty() {
        return Ok(Vec::new());
    }
    pick_cards::Entity::find()
        .filter(pick_cards::Column::RoundPickId.is_in(round_pick_ids.iter().copied()))
        .order_by_asc(pick_cards::Column::RoundPickId)
        .order_by_asc(pick_cards::Column::Position)
        .all(conn)
        .await
}

/// Flag a pick as the round's winner. Returns rows affected.
pub async fn mark_winner<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_pick_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    let result = round_picks::Entity::update_many()
        .set(round_picks::ActiveModel {
            is_winner: Set(true),
            ..Default::default()
        })
        .filter(round_picks::Column::Id.eq(round_pick_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

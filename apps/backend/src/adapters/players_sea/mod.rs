//! SeaORM adapter for players - generic over ConnectionTrait.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::players;

pub mod dto;

pub use dto::PlayerCreate;

pub async fn create_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PlayerCreate,
) -> Result<players::Model, sea_orm::DbErr> {
    let player = players::ActiveModel {
        id: NotSet,
        game_id: Set(dto.game_id),
        room_user_id: Set(dto.room_user_id),
        display_name: Set(dto.display_name),
        is_active: Set(true),
        created_at: Set(time::OffsetDateTime::now_utc()),
    };

    player.insert(conn).await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Option<players::Model>, sea_orm::DbErr> {
    players::Entity::find_by_id(player_id).one(conn).await
}

/// All players of a game in join order.
pub async fn find_all_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<players::Model>, sea_orm::DbErr> {
    players::Entity::find()
        .filter(players::Column::GameId.eq(game_id))
        .order_by_asc(players::Column::Id)
        .all(conn)
        .await
}

/// Active players of a game in join order.
pub async fn find_active_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<players::Model>, sea_orm::DbErr> {
    players::Entity::find()
        .filter(players::Column::GameId.eq(game_id))
        .filter(players::Column::IsActive.eq(true))
        .order_by_asc(players::Column::Id)
        .all(conn)
        .await
}

pub async fn set_active<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    is_active: bool,
) -> Result<u64, sea_orm::DbErr> {
    let result = players::Entity::update_many()
        .set(players::ActiveModel {
            is_active: Set(is_active),
            ..Default::default()
        })
        .filter(players::Column::Id.eq(player_id))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

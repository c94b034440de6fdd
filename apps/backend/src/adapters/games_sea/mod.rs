//! SeaORM adapter for games - generic over ConnectionTrait.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::games::{self, GameStatus};

pub mod dto;

pub use dto::{GameCreate, GameEnd};

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    games::Entity::find_by_id(game_id).one(conn).await
}

/// Games in the given status, oldest first.
pub async fn find_by_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    status: GameStatus,
) -> Result<Vec<games::Model>, sea_orm::DbErr> {
    games::Entity::find()
        .filter(games::Column::Status.eq(status))
        .order_by_asc(games::Column::Id)
        .all(conn)
        .await
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameCreate,
) -> Result<games::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();

    let game = games::ActiveModel {
        id: NotSet,
        room_id: Set(dto.room_id),
        status: Set(GameStatus::Playing),
        rng_seed: Set(dto.rng_seed),
        winner_player_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ended_at: Set(None),
    };

    game.insert(conn).await
}

/// Move a PLAYING game to ENDED. Returns rows affected: 0 means the game
/// was already ended (or does not exist).
pub async fn end_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameEnd,
) -> Result<u64, sea_orm::DbErr> {
    let result = games::Entity::update_many()
        .set(games::ActiveModel {
            status: Set(GameStatus::Ended),
            winner_player_id: Set(dto.winner_player_id),
            updated_at: Set(dto.ended_at),
            ended_at: Set(Some(dto.ended_at)),
            ..Default::default()
        })
        .filter(games::Column::Id.eq(dto.game_id))
        .filter(games::Column::Status.eq(GameStatus::Playing))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

//! SeaORM adapter for rounds - generic over ConnectionTrait.
//!
//! Every status change is a conditional update on the expected current
//! status. Callers read `rows_affected` to learn whether they won the race.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::rounds::{self, RoundStatus};

pub mod dto;

pub use dto::{RoundCreate, RoundEnd, RoundVoting};

pub async fn create_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoundCreate,
) -> Result<rounds::Model, sea_orm::DbErr> {
    let round = rounds::ActiveModel {
        id: NotSet,
        game_id: Set(dto.game_id),
        round_no: Set(dto.round_no),
        status: Set(RoundStatus::DrawingCards),
        judge_player_id: Set(dto.judge_player_id),
        prompt_card_id: Set(dto.prompt_card_id),
        winner_player_id: Set(None),
        created_at: Set(dto.created_at),
        ends_at: Set(dto.ends_at),
        voting_ends_at: Set(None),
        ended_at: Set(None),
    };

    round.insert(conn).await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Option<rounds::Model>, sea_orm::DbErr> {
    rounds::Entity::find_by_id(round_id).one(conn).await
}

/// Highest-numbered round of a game.
pub async fn find_latest_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<rounds::Model>, sea_orm::DbErr> {
    rounds::Entity::find()
        .filter(rounds::Column::GameId.eq(game_id))
        .order_by_desc(rounds::Column::RoundNo)
        .limit(1)
        .one(conn)
        .await
}

/// All rounds of a game in round order.
pub async fn find_all_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<rounds::Model>, sea_orm::DbErr> {
    rounds::Entity::find()
        .filter(rounds::Column::GameId.eq(game_id))
        .order_by_asc(rounds::Column::RoundNo)
        .all(conn)
        .await
}

/// Rounds of a game that have not reached ENDED.
pub async fn find_open_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<rounds::Model>, sea_orm::DbErr> {
    rounds::Entity::find()
        .filter(rounds::Column::GameId.eq(game_id))
        .filter(rounds::Column::Status.ne(RoundStatus::Ended))
        .order_by_asc(rounds::Column::RoundNo)
        .all(conn)
        .await
}

/// Winning player of every resolved round of a game, one entry per round.
pub async fn find_winners_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    let winners: Vec<Option<i64>> = rounds::Entity::find()
        .select_only()
        .column(rounds::Column::WinnerPlayerId)
        .filter(rounds::Column::GameId.eq(game_id))
        .filter(rounds::Column::Status.eq(RoundStatus::Ended))
        .filter(rounds::Column::WinnerPlayerId.is_not_null())
        .order_by_asc(rounds::Column::RoundNo)
        .into_tuple::<Option<i64>>()
        .all(conn)
        .await?;

    Ok(winners.into_iter().flatten().collect())
}

/// DRAWING_CARDS -> CZAR_VOTING. Drawing closes now; voting runs until
/// `voting_ends_at`.
pub async fn mark_voting<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoundVoting,
) -> Result<u64, sea_orm::DbErr> {
    let result = rounds::Entity::update_many()
        .set(rounds::ActiveModel {
            status: Set(RoundStatus::CzarVoting),
            ends_at: Set(dto.now),
            voting_ends_at: Set(Some(dto.voting_ends_at)),
            ..Default::default()
        })
        .filter(rounds::Column::Id.eq(dto.round_id))
        .filter(rounds::Column::Status.eq(RoundStatus::DrawingCards))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

/// CZAR_VOTING -> ENDED, with or without a winner.
pub async fn mark_ended<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoundEnd,
) -> Result<u64, sea_orm::DbErr> {
    let result = rounds::Entity::update_many()
        .set(rounds::ActiveModel {
            status: Set(RoundStatus::Ended),
            winner_player_id: Set(dto.winner_player_id),
            ended_at: Set(Some(dto.now)),
            ..Default::default()
        })
        .filter(rounds::Column::Id.eq(dto.round_id))
        .filter(rounds::Column::Status.eq(RoundStatus::CzarVoting))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

//! SeaORM adapter for card pool queries.
//!
//! The pool is derived, never stored: a game's cards are those of its
//! attached decks; an answer card is held while it has a `hand_cards` row and
//! played once it has a `pick_cards` row; a prompt is used once a round
//! references it.

use sea_orm::sea_query::Query;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::entities::{answer_cards, game_decks, hand_cards, pick_cards, prompt_cards, rounds};

fn game_deck_ids(game_id: i64) -> sea_orm::sea_query::SelectStatement {
    Query::select()
        .column(game_decks::Column::DeckId)
        .from(game_decks::Entity)
        .and_where(game_decks::Column::GameId.eq(game_id))
        .to_owned()
}

/// Prompt cards of the game's decks not yet drawn by any of its rounds,
/// ordered by id.
pub async fn find_unused_prompts<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<prompt_cards::Model>, sea_orm::DbErr> {
    prompt_cards::Entity::find()
        .filter(prompt_cards::Column::DeckId.in_subquery(game_deck_ids(game_id)))
        .filter(
            prompt_cards::Column::Id.not_in_subquery(
                Query::select()
                    .column(rounds::Column::PromptCardId)
                    .from(rounds::Entity)
                    .and_where(rounds::Column::GameId.eq(game_id))
                    .to_owned(),
            ),
        )
        .order_by_asc(prompt_cards::Column::Id)
        .all(conn)
        .await
}

/// Ids of answer cards in the game's undealt pool: attached to the game,
/// not held by any player, never played. Ordered by id.
pub async fn find_pool_answer_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    answer_cards::Entity::find()
        .select_only()
        .column(answer_cards::Column::Id)
        .filter(answer_cards::Column::DeckId.in_subquery(game_deck_ids(game_id)))
        .filter(
            answer_cards::Column::Id.not_in_subquery(
                Query::select()
                    .column(hand_cards::Column::AnswerCardId)
                    .from(hand_cards::Entity)
                    .and_where(hand_cards::Column::GameId.eq(game_id))
                    .to_owned(),
            ),
        )
        .filter(
            answer_cards::Column::Id.not_in_subquery(
                Query::select()
                    .column(pick_cards::Column::AnswerCardId)
                    .from(pick_cards::Entity)
                    .and_where(pick_cards::Column::GameId.eq(game_id))
                    .to_owned(),
            ),
        )
        .order_by_asc(answer_cards::Column::Id)
        .into_tuple::<i64>()
        .all(conn)
        .await
}

/// Ids of answer cards submitted in any round of the game.
pub async fn find_played_answer_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    pick_cards::Entity::find()
        .select_only()
        .column(pick_cards::Column::AnswerCardId)
        .filter(pick_cards::Column::GameId.eq(game_id))
        .order_by_asc(pick_cards::Column::AnswerCardId)
        .into_tuple::<i64>()
        .all(conn)
        .await
}

/// Ids of every answer card attached to the game, ordered by id.
pub async fn find_game_answer_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    answer_cards::Entity::find()
        .select_only()
        .column(answer_cards::Column::Id)
        .filter(answer_cards::Column::DeckId.in_subquery(game_deck_ids(game_id)))
        .order_by_asc(answer_cards::Column::Id)
        .into_tuple::<i64>()
        .all(conn)
        .await
}

pub async fn find_answer_cards<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: &[i64],
) -> Result<Vec<answer_cards::Model>, sea_orm::DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    answer_cards::Entity::find()
        .filter(answer_cards::Column::Id.is_in(ids.iter().copied()))
        .all(conn)
        .await
}

pub async fn find_prompt<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    prompt_card_id: i64,
) -> Result<Option<prompt_cards::Model>, sea_orm::DbErr> {
    prompt_cards::Entity::find_by_id(prompt_card_id).one(conn).await
}

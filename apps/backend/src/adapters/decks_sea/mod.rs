//! SeaORM adapter for decks, their cards, and the game <-> deck link.
//!
//! Catalog management lives outside the engine; the inserts here exist for
//! seeding and tests.

use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, NotSet, Set};

use crate::entities::{answer_cards, decks, game_decks, prompt_cards};

pub mod dto;

pub use dto::{AnswerCardCreate, PromptCardCreate};

pub async fn create_deck<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: &str,
) -> Result<decks::Model, sea_orm::DbErr> {
    let deck = decks::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        created_at: Set(time::OffsetDateTime::now_utc()),
    };
    deck.insert(conn).await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    deck_id: i64,
) -> Result<Option<decks::Model>, sea_orm::DbErr> {
    decks::Entity::find_by_id(deck_id).one(conn).await
}

pub async fn create_prompt_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PromptCardCreate,
) -> Result<prompt_cards::Model, sea_orm::DbErr> {
    let card = prompt_cards::ActiveModel {
        id: NotSet,
        deck_id: Set(dto.deck_id),
        content: Set(dto.content),
        pick: Set(dto.pick),
    };
    card.insert(conn).await
}

pub async fn create_answer_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: AnswerCardCreate,
) -> Result<answer_cards::Model, sea_orm::DbErr> {
    let card = answer_cards::ActiveModel {
        id: NotSet,
        deck_id: Set(dto.deck_id),
        content: Set(dto.content),
    };
    card.insert(conn).await
}

pub async fn attach_deck<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    deck_id: i64,
) -> Result<game_decks::Model, sea_orm::DbErr> {
    let link = game_decks::ActiveModel {
        id: NotSet,
        game_id: Set(game_id),
        deck_id: Set(deck_id),
    };
    link.insert(conn).await
}

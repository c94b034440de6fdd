//! Deck and card catalog repository functions.

use sea_orm::ConnectionTrait;

use crate::adapters::{cards_sea, decks_sea};
use crate::entities::{answer_cards, prompt_cards};
use crate::errors::domain::{DomainError, NotFoundKind};

/// A prompt card. `pick` is how many answer cards a submission must contain.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PromptCard {
    pub id: i64,
    pub content: String,
    pub pick: u8,
}

impl From<prompt_cards::Model> for PromptCard {
    fn from(model: prompt_cards::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
            pick: model.pick.clamp(1, u8::MAX as i16) as u8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AnswerCard {
    pub id: i64,
    pub content: String,
}

impl From<answer_cards::Model> for AnswerCard {
    fn from(model: answer_cards::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
        }
    }
}

pub async fn create_deck<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: &str,
) -> Result<i64, DomainError> {
    Ok(decks_sea::create_deck(conn, name).await?.id)
}

pub async fn create_prompt_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    deck_id: i64,
    content: &str,
    pick: u8,
) -> Result<PromptCard, DomainError> {
    let card = decks_sea::create_prompt_card(
        conn,
        decks_sea::PromptCardCreate {
            deck_id,
            content: content.to_string(),
            pick: pick as i16,
        },
    )
    .await?;
    Ok(PromptCard::from(card))
}

pub async fn create_answer_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    deck_id: i64,
    content: &str,
) -> Result<AnswerCard, DomainError> {
    let card = decks_sea::create_answer_card(
        conn,
        decks_sea::AnswerCardCreate {
            deck_id,
            content: content.to_string(),
        },
    )
    .await?;
    Ok(AnswerCard::from(card))
}

/// Attach an existing deck to a game. `NotFound` if the deck is unknown.
pub async fn attach_deck<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    deck_id: i64,
) -> Result<(), DomainError> {
    if decks_sea::find_by_id(conn, deck_id).await?.is_none() {
        return Err(DomainError::not_found(
            NotFoundKind::Deck,
            format!("Deck {deck_id} not found"),
        ));
    }
    decks_sea::attach_deck(conn, game_id, deck_id).await?;
    Ok(())
}

pub async fn find_prompt<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    prompt_card_id: i64,
) -> Result<PromptCard, DomainError> {
    cards_sea::find_prompt(conn, prompt_card_id)
        .await?
        .map(PromptCard::from)
        .ok_or_else(|| {
            DomainError::invariant(format!("prompt card {prompt_card_id} referenced but missing"))
        })
}

/// Prompts not yet drawn in the game, ordered by id.
pub async fn find_unused_prompts<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<PromptCard>, DomainError> {
    let prompts = cards_sea::find_unused_prompts(conn, game_id).await?;
    Ok(prompts.into_iter().map(PromptCard::from).collect())
}

/// Answer cards by id, returned in the order of `ids`. Unknown ids are skipped.
pub async fn find_answer_cards<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: &[i64],
) -> Result<Vec<AnswerCard>, DomainError> {
    let mut cards = cards_sea::find_answer_cards(conn, ids).await?;
    cards.sort_by_key(|c| ids.iter().position(|id| *id == c.id));
    Ok(cards.into_iter().map(AnswerCard::from).collect())
}

/// Ids of answer cards still in the undealt pool, ordered by id.
pub async fn find_pool_answer_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<i64>, DomainError> {
    Ok(cards_sea::find_pool_answer_ids(conn, game_id).await?)
}

/// Ids of every answer card the game's decks contain.
pub async fn find_game_answer_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<i64>, DomainError> {
    Ok(cards_sea::find_game_answer_ids(conn, game_id).await?)
}

/// Ids of answer cards already played in the game.
pub async fn find_played_answer_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<i64>, DomainError> {
    Ok(cards_sea::find_played_answer_ids(conn, game_id).await?)
}

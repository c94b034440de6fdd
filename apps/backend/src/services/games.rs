//! Game lifecycle outside the round loop: creation by the lobby layer,
//! forced endings, player activity and the reconnect snapshot.

use std::collections::{HashMap, HashSet};

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;

use crate::entities::games::GameStatus;
use crate::entities::rounds::RoundStatus;
use crate::error::AppError;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::repos::decks::{self, AnswerCard, PromptCard};
use crate::repos::games::{self, Game};
use crate::repos::players::{self, Player};
use crate::repos::{picks, rounds};
use crate::services::win_evaluator;
use crate::utils::time::unix_ms;

/// A room member taking part in the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub room_user_id: i64,
    pub display_name: String,
}

/// Everything the lobby hands over when the host starts a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSetup {
    pub room_id: i64,
    pub players: Vec<NewPlayer>,
    pub deck_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct CreatedGame {
    pub game: Game,
    pub players: Vec<Player>,
}

/// Persist a PLAYING game with its players and decks. No round is opened;
/// that is `StartGame`.
pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    setup: GameSetup,
) -> Result<CreatedGame, AppError> {
    if setup.players.len() < 2 {
        return Err(DomainError::validation(
            ValidationKind::InvalidGameSetup,
            "a game needs at least two players",
        )
        .into());
    }
    if setup.deck_ids.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::InvalidGameSetup,
            "a game needs at least one deck",
        )
        .into());
    }
    let mut seen = HashSet::new();
    if !setup.players.iter().all(|p| seen.insert(p.room_user_id)) {
        return Err(DomainError::validation(
            ValidationKind::InvalidGameSetup,
            "room member listed twice",
        )
        .into());
    }

    let game = games::create_game(conn, setup.room_id, rand::random::<i64>()).await?;

    let mut created = Vec::with_capacity(setup.players.len());
    for p in &setup.players {
        created.push(players::create_player(conn, game.id, p.room_user_id, &p.display_name).await?);
    }

    let deck_ids: Vec<i64> = {
        let mut seen = HashSet::new();
        setup
            .deck_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    };
    for deck_id in deck_ids {
        decks::attach_deck(conn, game.id, deck_id).await?;
    }

    info!(
        game_id = game.id,
        room_id = game.room_id,
        players = created.len(),
        "Game created"
    );
    Ok(CreatedGame {
        game,
        players: created,
    })
}

/// End a game that cannot continue. Returns `false` if it had already ended.
pub async fn end_without_winner<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    now: OffsetDateTime,
) -> Result<bool, AppError> {
    let ended = games::end_game(conn, game_id, None, now).await?;
    if ended {
        info!(game_id, "Game ended without a winner");
    }
    Ok(ended)
}

/// Mark a player active or inactive.
pub async fn set_player_active<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    is_active: bool,
) -> Result<Player, AppError> {
    let mut player = players::require_player(conn, player_id).await?;
    players::set_active(conn, player_id, is_active).await?;
    player.is_active = is_active;
    Ok(player)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub player_id: i64,
    pub display_name: String,
    pub is_active: bool,
    /// Rounds won so far.
    pub points: u32,
}

/// A submission as shown to clients. The author stays hidden until the
/// round has ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickView {
    pub round_pick_id: i64,
    pub player_id: Option<i64>,
    pub answer_cards: Vec<AnswerCard>,
    pub is_winner: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundView {
    pub round_id: i64,
    pub round_no: i32,
    pub status: RoundStatus,
    pub judge_player_id: i64,
    pub prompt: PromptCard,
    /// Unix ms.
    pub ends_at: i64,
    pub voting_ends_at: Option<i64>,
    pub winner_player_id: Option<i64>,
    pub submitted_player_ids: Vec<i64>,
    /// Empty while cards are still being drawn.
    pub picks: Vec<PickView>,
}

/// What a (re)connecting client needs to render the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub game_id: i64,
    pub status: GameStatus,
    pub winner_player_id: Option<i64>,
    pub win_threshold: u32,
    pub players: Vec<PlayerView>,
    /// Latest round, open or ended.
    pub round: Option<RoundView>,
}

pub async fn load_snapshot<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    win_threshold: u32,
) -> Result<GameSnapshot, AppError> {
    let game = games::require_game(conn, game_id).await?;
    let tally = win_evaluator::tally(conn, game_id).await?;

    let players = players::find_all_by_game(conn, game_id)
        .await?
        .into_iter()
        .map(|p| PlayerView {
            points: tally.get(&p.id).copied().unwrap_or(0),
            player_id: p.id,
            display_name: p.display_name,
            is_active: p.is_active,
        })
        .collect();

    let round = match rounds::find_latest_by_game(conn, game_id).await? {
        Some(round) => Some(round_view(conn, round).await?),
        None => None,
    };

    Ok(GameSnapshot {
        game_id,
        status: game.status,
        winner_player_id: game.winner_player_id,
        win_threshold,
        players,
        round,
    })
}

/// Client view of one round.
pub async fn load_round_view<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<RoundView, AppError> {
    let round = rounds::require_round(conn, round_id).await?;
    round_view(conn, round).await
}

async fn round_view<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round: rounds::Round,
) -> Result<RoundView, AppError> {
    let prompt = decks::find_prompt(conn, round.prompt_card_id).await?;
    let round_picks = picks::find_by_round(conn, round.id).await?;
    let submitted_player_ids = round_picks.iter().map(|p| p.player_id).collect();

    let picks = if round.status == RoundStatus::DrawingCards {
        Vec::new()
    } else {
        let card_ids: Vec<i64> = round_picks
            .iter()
            .flat_map(|p| p.answer_card_ids.iter().copied())
            .collect();
        let cards: HashMap<i64, AnswerCard> = decks::find_answer_cards(conn, &card_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let reveal = round.status == RoundStatus::Ended;

        round_picks
            .into_iter()
            .map(|p| PickView {
                round_pick_id: p.id,
                player_id: reveal.then_some(p.player_id),
                answer_cards: p
                    .answer_card_ids
                    .iter()
                    .filter_map(|id| cards.get(id).cloned())
                    .collect(),
                is_winner: p.is_winner,
            })
            .collect()
    };

    Ok(RoundView {
        round_id: round.id,
        round_no: round.round_no,
        status: round.status,
        judge_player_id: round.judge_player_id,
        prompt,
        ends_at: unix_ms(round.ends_at),
        voting_ends_at: round.voting_ends_at.map(unix_ms),
        winner_player_id: round.winner_player_id,
        submitted_player_ids,
        picks,
    })
}

use cah_engine::engine::{CommandOutcome, GameCommand};
use cah_engine::repos::{decks, players, rounds};
use cah_engine::services::games::{CreatedGame, GameSetup, NewPlayer};
use cah_engine::state::app_state::AppState;
use cah_engine::AppError;
use sea_orm::ConnectionTrait;

/// Seed a deck with one prompt per entry of `prompt_picks` and `answers`
/// answer cards.
pub async fn seed_deck<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: &str,
    prompt_picks: &[u8],
    answers: usize,
) -> Result<i64, AppError> {
    let deck_id = decks::create_deck(conn, name).await?;
    for (i, pick) in prompt_picks.iter().enumerate() {
        decks::create_prompt_card(conn, deck_id, &format!("{name} prompt {i} ____"), *pick)
            .await?;
    }
    for i in 0..answers {
        decks::create_answer_card(conn, deck_id, &format!("{name} answer {i}")).await?;
    }
    Ok(deck_id)
}

pub fn new_players(count: usize) -> Vec<NewPlayer> {
    (0..count)
        .map(|i| NewPlayer {
            room_user_id: 100 + i as i64,
            display_name: format!("player-{i}"),
        })
        .collect()
}

/// Create a game through the engine over the given decks.
pub async fn create_game(
    state: &AppState,
    player_count: usize,
    deck_ids: Vec<i64>,
) -> Result<CreatedGame, AppError> {
    state
        .engine
        .create_game(GameSetup {
            room_id: 1,
            players: new_players(player_count),
            deck_ids,
        })
        .await
}

/// A started game and its first round.
#[derive(Debug, Clone)]
pub struct StartedGame {
    pub game_id: i64,
    pub player_ids: Vec<i64>,
    pub round_id: i64,
}

impl StartedGame {
    pub async fn judge(&self, state: &AppState) -> Result<i64, AppError> {
        let round = rounds::require_round(&state.db, self.round_id).await?;
        Ok(round.judge_player_id)
    }

    /// Players expected to submit this round, in join order.
    pub async fn submitters(&self, state: &AppState) -> Result<Vec<i64>, AppError> {
        let judge = self.judge(state).await?;
        Ok(self
            .player_ids
            .iter()
            .copied()
            .filter(|p| *p != judge)
            .collect())
    }
}

/// Seed a deck, create a game and dispatch `StartGame`.
pub async fn start_game(
    state: &AppState,
    player_count: usize,
    prompt_picks: &[u8],
    answers: usize,
) -> Result<StartedGame, AppError> {
    let deck_id = seed_deck(&state.db, "base", prompt_picks, answers).await?;
    let created = create_game(state, player_count, vec![deck_id]).await?;
    let game_id = created.game.id;

    let outcome = state
        .engine
        .dispatch(GameCommand::StartGame { game_id })
        .await?;
    let CommandOutcome::RoundStarted { round_id, .. } = outcome else {
        panic!("expected the first round to start, got {outcome:?}");
    };

    Ok(StartedGame {
        game_id,
        player_ids: created.players.iter().map(|p| p.id).collect(),
        round_id,
    })
}

/// Play the first `count` cards of a player's hand into a round.
pub async fn submit_from_hand(
    state: &AppState,
    round_id: i64,
    player_id: i64,
    count: usize,
) -> Result<CommandOutcome, AppError> {
    let hand = state.engine.hand(player_id).await?;
    let answer_card_ids = hand.iter().take(count).map(|c| c.id).collect();
    state
        .engine
        .dispatch(GameCommand::SubmitPick {
            round_id,
            player_id,
            answer_card_ids,
        })
        .await
}

/// Every expected player submits one card.
pub async fn submit_all(state: &AppState, game: &StartedGame) -> Result<(), AppError> {
    for player_id in game.submitters(state).await? {
        submit_from_hand(state, game.round_id, player_id, 1).await?;
    }
    Ok(())
}

/// The open round of a game, if any.
pub async fn open_round_id(state: &AppState, game_id: i64) -> Result<Option<i64>, AppError> {
    Ok(rounds::find_open_by_game(&state.db, game_id)
        .await?
        .map(|r| r.id))
}

pub async fn active_count(state: &AppState, game_id: i64) -> Result<usize, AppError> {
    Ok(players::find_active_by_game(&state.db, game_id).await?.len())
}

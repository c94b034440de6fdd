//! Round State Machine: DRAWING_CARDS -> CZAR_VOTING -> ENDED.
//!
//! A round never goes back; the next round is a new row. Every transition
//! is a conditional update on the expected status, so when two triggers
//! race only the first observer of the old status performs it.

use std::collections::HashSet;
use std::time::Duration;

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::adapters::rounds_sea::RoundCreate;
use crate::config::game::GameRules;
use crate::domain::{choose_one, round_rng, SeedPurpose};
use crate::entities::rounds::RoundStatus;
use crate::error::AppError;
use crate::errors::domain::{
    ConflictKind, DomainError, NotFoundKind, PoolKind, ValidationKind,
};
use crate::repos::decks::{self, PromptCard};
use crate::repos::picks::{self, RoundPick};
use crate::repos::rounds::{self, Round};
use crate::repos::{games, hands, players};
use crate::services::card_pool::{self, Dealt, ShortfallPolicy};
use crate::services::judge_rotation;

/// A freshly opened round.
#[derive(Debug, Clone)]
pub struct RoundStart {
    pub round: Round,
    pub prompt: PromptCard,
    /// Cards dealt to each active player for this round.
    pub dealt: Dealt,
}

/// Result of asking for DRAWING_CARDS -> CZAR_VOTING.
#[derive(Debug, Clone, PartialEq)]
pub enum VotingTransition {
    /// This call moved the round; `pick_count` picks are up for the vote.
    Advanced { round: Round, pick_count: usize },
    /// Someone else already did, or the round ended.
    AlreadyAdvanced,
}

/// A round resolved by the judge's vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub game_id: i64,
    pub round_id: i64,
    pub round_no: i32,
    pub round_pick_id: i64,
    pub winner_player_id: i64,
}

/// Submissions received against those expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionStatus {
    pub submitted: Vec<i64>,
    /// Active non-judge players.
    pub expected: Vec<i64>,
}

impl SubmissionStatus {
    /// Every active non-judge player has submitted.
    pub fn is_complete(&self) -> bool {
        self.expected.iter().all(|p| self.submitted.contains(p))
    }
}

/// Open the next round of a game.
///
/// Draws a prompt from the game's unused prompts, rotates the judge,
/// persists the round in DRAWING_CARDS with `ends_at = now + round_duration`
/// and tops every active player's hand up to `hand_size`. A short answer pool
/// deals what is left rather than failing.
pub async fn create_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    rules: &GameRules,
    now: OffsetDateTime,
) -> Result<RoundStart, AppError> {
    let game = games::require_game(conn, game_id).await?;
    if !game.is_playing() {
        return Err(DomainError::phase_mismatch(format!("game {game_id} has ended")).into());
    }

    if let Some(open) = rounds::find_open_by_game(conn, game_id).await? {
        return Err(DomainError::conflict(
            ConflictKind::RoundInProgress,
            format!("round {} of game {game_id} is still open", open.round_no),
        )
        .into());
    }

    let active = players::find_active_by_game(conn, game_id).await?;
    if active.len() < 2 {
        return Err(DomainError::validation(
            ValidationKind::NotEnoughPlayers,
            format!("game {game_id} has {} active players", active.len()),
        )
        .into());
    }

    let round_no = rounds::find_latest_by_game(conn, game_id)
        .await?
        .map_or(1, |r| r.round_no + 1);

    let prompts = decks::find_unused_prompts(conn, game_id).await?;
    let mut prompt_rng = round_rng(game.rng_seed, round_no, SeedPurpose::Prompt);
    let prompt_ids: Vec<i64> = prompts.iter().map(|p| p.id).collect();
    let Some(prompt_id) = choose_one(&prompt_ids, &mut prompt_rng) else {
        return Err(DomainError::pool_exhausted(
            PoolKind::PromptCards,
            format!("game {game_id} has no prompts left"),
        )
        .into());
    };
    let prompt = prompts
        .into_iter()
        .find(|p| p.id == prompt_id)
        .ok_or_else(|| DomainError::invariant("drawn prompt missing from candidates"))?;

    let judge_player_id =
        judge_rotation::select_next_judge(conn, game_id, game.rng_seed, round_no).await?;

    let round = rounds::create_round(
        conn,
        RoundCreate {
            game_id,
            round_no,
            judge_player_id,
            prompt_card_id: prompt.id,
            created_at: now,
            ends_at: now + rules.round_duration,
        },
    )
    .await?;

    let player_ids: Vec<i64> = active.iter().map(|p| p.id).collect();
    let needs = card_pool::needs_for(conn, game_id, &player_ids, rules.hand_size).await?;
    let dealt = card_pool::replenish_hands(
        conn,
        game_id,
        game.rng_seed,
        round_no,
        &needs,
        ShortfallPolicy::DealAvailable,
        now,
    )
    .await?;

    info!(
        game_id,
        round_id = round.id,
        round_no,
        judge_player_id,
        prompt_card_id = prompt.id,
        pick = prompt.pick,
        "Round started"
    );

    Ok(RoundStart {
        round,
        prompt,
        dealt,
    })
}

/// Record a player's submission. No transition happens here; the caller
/// checks [`submission_status`] afterwards.
///
/// The submitted cards leave the hand and become played for the rest of
/// the game.
pub async fn submit_pick<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    player_id: i64,
    answer_card_ids: &[i64],
) -> Result<RoundPick, AppError> {
    let round = rounds::require_round(conn, round_id).await?;
    if round.status != RoundStatus::DrawingCards {
        return Err(DomainError::phase_mismatch(format!(
            "round {round_id} is not accepting picks ({:?})",
            round.status
        ))
        .into());
    }

    let player = players::require_player(conn, player_id).await?;
    if player.game_id != round.game_id {
        return Err(DomainError::not_found(
            NotFoundKind::Player,
            format!("player {player_id} is not in game {}", round.game_id),
        )
        .into());
    }
    if !player.is_active {
        return Err(DomainError::validation(
            ValidationKind::PlayerInactive,
            format!("player {player_id} is inactive"),
        )
        .into());
    }
    if player_id == round.judge_player_id {
        return Err(DomainError::validation(
            ValidationKind::JudgeCannotSubmit,
            "the judge does not submit cards",
        )
        .into());
    }
    if picks::has_submitted(conn, round_id, player_id).await? {
        return Err(DomainError::validation(
            ValidationKind::AlreadySubmitted,
            format!("player {player_id} already submitted for round {round_id}"),
        )
        .into());
    }

    let prompt = decks::find_prompt(conn, round.prompt_card_id).await?;
    if answer_card_ids.len() != prompt.pick as usize {
        return Err(DomainError::validation(
            ValidationKind::WrongCardCount,
            format!(
                "prompt needs {} cards, got {}",
                prompt.pick,
                answer_card_ids.len()
            ),
        )
        .into());
    }

    let unique: HashSet<i64> = answer_card_ids.iter().copied().collect();
    if unique.len() != answer_card_ids.len() {
        return Err(
            DomainError::validation(ValidationKind::DuplicateCard, "card listed twice").into(),
        );
    }

    let hand: HashSet<i64> = hands::card_ids_of(conn, player_id)
        .await?
        .into_iter()
        .collect();
    if let Some(missing) = answer_card_ids.iter().find(|id| !hand.contains(id)) {
        return Err(DomainError::validation(
            ValidationKind::CardNotInHand,
            format!("card {missing} is not in player {player_id}'s hand"),
        )
        .into());
    }

    let pick = picks::create_pick(conn, round.game_id, round_id, player_id, answer_card_ids).await?;
    let removed = hands::remove_cards(conn, player_id, answer_card_ids).await?;
    if removed as usize != answer_card_ids.len() {
        return Err(DomainError::invariant(format!(
            "removed {removed} of {} submitted cards from player {player_id}",
            answer_card_ids.len()
        ))
        .into());
    }

    debug!(
        game_id = round.game_id,
        round_id,
        player_id,
        round_pick_id = pick.id,
        "Pick submitted"
    );
    Ok(pick)
}

/// Who has submitted and who is expected to.
pub async fn submission_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round: &Round,
) -> Result<SubmissionStatus, AppError> {
    let expected = players::find_active_by_game(conn, round.game_id)
        .await?
        .into_iter()
        .filter(|p| p.id != round.judge_player_id)
        .map(|p| p.id)
        .collect();
    let submitted = picks::submitted_player_ids(conn, round.id).await?;
    Ok(SubmissionStatus {
        submitted,
        expected,
    })
}

/// DRAWING_CARDS -> CZAR_VOTING. Idempotent: only the first caller moves the
/// round, later callers get [`VotingTransition::AlreadyAdvanced`].
///
/// The drawing deadline is frozen at `now` and the voting deadline set to
/// `now + voting_duration`.
pub async fn transition_to_voting<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    voting_duration: Duration,
    now: OffsetDateTime,
) -> Result<VotingTransition, AppError> {
    if !rounds::mark_voting(conn, round_id, now, now + voting_duration).await? {
        debug!(round_id, "Voting transition already applied");
        return Ok(VotingTransition::AlreadyAdvanced);
    }

    let round = rounds::require_round(conn, round_id).await?;
    let pick_count = picks::submitted_player_ids(conn, round_id).await?.len();
    info!(
        game_id = round.game_id,
        round_id,
        round_no = round.round_no,
        pick_count,
        "Round entered voting"
    );
    Ok(VotingTransition::Advanced { round, pick_count })
}

/// CZAR_VOTING -> ENDED with the chosen pick as winner.
///
/// Only the round's judge may vote, and never for their own pick. A round
/// that already ended, or one still drawing, is a phase mismatch.
pub async fn resolve<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_pick_id: i64,
    judge_player_id: i64,
    now: OffsetDateTime,
) -> Result<Resolution, AppError> {
    let pick = picks::require_pick(conn, round_pick_id).await?;
    let round = rounds::require_round(conn, pick.round_id).await?;

    if round.status != RoundStatus::CzarVoting {
        return Err(DomainError::phase_mismatch(format!(
            "round {} is not in voting ({:?})",
            round.id, round.status
        ))
        .into());
    }
    if judge_player_id != round.judge_player_id {
        return Err(DomainError::validation(
            ValidationKind::NotJudge,
            format!("player {judge_player_id} is not judging round {}", round.id),
        )
        .into());
    }
    if pick.player_id == judge_player_id {
        return Err(DomainError::validation(
            ValidationKind::SelfVote,
            "the judge cannot choose their own pick",
        )
        .into());
    }

    if !rounds::mark_ended(conn, round.id, Some(pick.player_id), now).await? {
        return Err(DomainError::phase_mismatch(format!("round {} already ended", round.id)).into());
    }
    picks::mark_winner(conn, round_pick_id).await?;

    info!(
        game_id = round.game_id,
        round_id = round.id,
        round_no = round.round_no,
        winner_player_id = pick.player_id,
        "Round resolved"
    );
    Ok(Resolution {
        game_id: round.game_id,
        round_id: round.id,
        round_no: round.round_no,
        round_pick_id,
        winner_player_id: pick.player_id,
    })
}

/// CZAR_VOTING -> ENDED without a winner (empty vote or voting timeout).
/// Returns `false` if the round had already left voting.
pub async fn close_without_winner<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    now: OffsetDateTime,
) -> Result<bool, AppError> {
    let closed = rounds::mark_ended(conn, round_id, None, now).await?;
    if closed {
        info!(round_id, "Round closed without a winner");
    } else {
        debug!(round_id, "Round was no longer in voting when closing");
    }
    Ok(closed)
}

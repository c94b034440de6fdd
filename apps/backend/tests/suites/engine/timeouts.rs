// Deadlines firing on their own.

use std::time::Duration;

use cah_engine::engine::{
    ArmedTimer, CommandOutcome, EndReason, GameCommand, GameEvent, SkipReason, TimerKind,
};
use cah_engine::entities::rounds::RoundStatus;
use cah_engine::repos::{picks, rounds};
use cah_engine::state::app_state::AppState;
use cah_engine::{AppError, ErrorCode};
use sea_orm::ConnectionTrait;

use crate::common::WAIT_LIMIT;
use crate::support::fixtures::{start_game, submit_all, submit_from_hand};
use crate::support::test_state::{build_test_state, fast_rules, manual_rules};
use crate::support::wait::wait_for_events;

#[tokio::test]
async fn drawing_deadline_opens_voting_and_voting_deadline_skips() -> Result<(), AppError> {
    let (state, recorder) = build_test_state(fast_rules()).await?;
    let game = start_game(&state, 3, &[1; 10], 60).await?;
    let submitter = game.submitters(&state).await?[0];
    submit_from_hand(&state, game.round_id, submitter, 1).await?;

    assert!(wait_for_events(&recorder, "round_ended", 1, WAIT_LIMIT).await);
    let GameEvent::RoundEnded { reason, round } = &recorder.of("round_ended")[0] else {
        unreachable!();
    };
    assert_eq!(*reason, EndReason::Timeout);
    assert_eq!(round.round_id, game.round_id);
    assert_eq!(round.picks.len(), 1);

    assert!(wait_for_events(&recorder, "round_skipped", 1, WAIT_LIMIT).await);
    let GameEvent::RoundSkipped { round_id, reason } = recorder.of("round_skipped")[0] else {
        unreachable!();
    };
    assert_eq!(round_id, game.round_id);
    assert_eq!(reason, SkipReason::VotingTimeout);

    let ended = rounds::require_round(&state.db, game.round_id).await?;
    assert_eq!(ended.status, RoundStatus::Ended);
    assert_eq!(ended.winner_player_id, None);

    // the game carries on after the cool-down
    assert!(wait_for_events(&recorder, "round_started", 2, WAIT_LIMIT).await);
    Ok(())
}

#[tokio::test]
async fn drawing_deadline_without_picks_skips_the_round() -> Result<(), AppError> {
    let (state, recorder) = build_test_state(fast_rules()).await?;
    let game = start_game(&state, 3, &[1; 10], 60).await?;

    assert!(wait_for_events(&recorder, "round_skipped", 1, WAIT_LIMIT).await);
    let GameEvent::RoundSkipped { round_id, reason } = recorder.of("round_skipped")[0] else {
        unreachable!();
    };
    assert_eq!(round_id, game.round_id);
    assert_eq!(reason, SkipReason::NoPicks);

    let names = recorder.names();
    let ended_at = names.iter().position(|n| *n == "round_ended");
    let skipped_at = names.iter().position(|n| *n == "round_skipped");
    assert!(ended_at < skipped_at, "round_ended precedes round_skipped: {names:?}");
    Ok(())
}

#[tokio::test]
async fn stale_voting_timeout_after_a_vote_is_ignored() -> Result<(), AppError> {
    let (state, recorder) = build_test_state(manual_rules()).await?;
    let game = start_game(&state, 3, &[1, 1], 40).await?;
    submit_all(&state, &game).await?;
    let judge = game.judge(&state).await?;
    let pick = picks::find_by_round(&state.db, game.round_id).await?[0].clone();

    state
        .engine
        .dispatch(GameCommand::CastVote {
            judge_player_id: judge,
            round_pick_id: pick.id,
        })
        .await?;

    let outcome = state
        .engine
        .dispatch(GameCommand::VotingTimeout {
            game_id: game.game_id,
            round_id: game.round_id,
        })
        .await?;
    assert_eq!(outcome, CommandOutcome::Ignored);
    assert_eq!(recorder.count("round_skipped"), 0);

    let round = rounds::require_round(&state.db, game.round_id).await?;
    assert_eq!(round.winner_player_id, Some(pick.player_id));
    Ok(())
}

#[tokio::test]
async fn vote_after_the_voting_deadline_is_rejected() -> Result<(), AppError> {
    let (state, _) = build_test_state(manual_rules()).await?;
    let game = start_game(&state, 3, &[1, 1], 40).await?;
    submit_all(&state, &game).await?;
    let judge = game.judge(&state).await?;
    let pick = picks::find_by_round(&state.db, game.round_id).await?[0].clone();

    let outcome = state
        .engine
        .dispatch(GameCommand::VotingTimeout {
            game_id: game.game_id,
            round_id: game.round_id,
        })
        .await?;
    assert_eq!(
        outcome,
        CommandOutcome::RoundClosed {
            round_id: game.round_id
        }
    );

    let err = state
        .engine
        .dispatch(GameCommand::CastVote {
            judge_player_id: judge,
            round_pick_id: pick.id,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PhaseMismatch);
    Ok(())
}

#[tokio::test]
async fn stale_drawing_timeout_is_ignored() -> Result<(), AppError> {
    let (state, recorder) = build_test_state(manual_rules()).await?;
    let game = start_game(&state, 3, &[1, 1], 40).await?;
    submit_all(&state, &game).await?;
    assert_eq!(recorder.count("round_ended"), 1);

    let outcome = state
        .engine
        .dispatch(GameCommand::DrawingTimeout {
            game_id: game.game_id,
            round_id: game.round_id,
        })
        .await?;
    assert_eq!(outcome, CommandOutcome::Ignored);
    assert_eq!(recorder.count("round_ended"), 1);
    Ok(())
}

/// Make every DRAWING_CARDS -> CZAR_VOTING update fail until
/// [`allow_voting`] runs.
async fn block_voting(state: &AppState) -> Result<(), AppError> {
    state
        .db
        .execute_unprepared(
            "CREATE TRIGGER block_voting BEFORE UPDATE OF status ON rounds \
             WHEN NEW.status = 'CZAR_VOTING' \
             BEGIN SELECT RAISE(ABORT, 'voting blocked'); END",
        )
        .await?;
    Ok(())
}

async fn allow_voting(state: &AppState) -> Result<(), AppError> {
    state
        .db
        .execute_unprepared("DROP TRIGGER block_voting")
        .await?;
    Ok(())
}

#[tokio::test]
async fn drawing_deadline_retries_after_a_failed_transition() -> Result<(), AppError> {
    let rules = fast_rules().with_timer_retry(Duration::from_millis(100));
    let (state, recorder) = build_test_state(rules).await?;
    let game = start_game(&state, 3, &[1; 10], 60).await?;
    block_voting(&state).await?;

    // past the deadline, before the first retry
    tokio::time::sleep(Duration::from_millis(220)).await;
    let round = rounds::require_round(&state.db, game.round_id).await?;
    assert_eq!(round.status, RoundStatus::DrawingCards);
    assert_eq!(recorder.count("error"), 0);

    allow_voting(&state).await?;
    assert!(wait_for_events(&recorder, "round_ended", 1, WAIT_LIMIT).await);
    let GameEvent::RoundEnded { reason, round } = &recorder.of("round_ended")[0] else {
        unreachable!();
    };
    assert_eq!(*reason, EndReason::Timeout);
    assert_eq!(round.round_id, game.round_id);
    assert_eq!(recorder.count("error"), 0);
    Ok(())
}

#[tokio::test]
async fn failed_all_played_close_keeps_the_drawing_deadline() -> Result<(), AppError> {
    let (state, recorder) = build_test_state(manual_rules()).await?;
    let game = start_game(&state, 3, &[1; 10], 60).await?;
    let submitters = game.submitters(&state).await?;
    submit_from_hand(&state, game.round_id, submitters[0], 1).await?;

    block_voting(&state).await?;
    let err = submit_from_hand(&state, game.round_id, submitters[1], 1)
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert_eq!(recorder.count("pick_submitted"), 2);
    assert_eq!(
        state.engine.timers().armed(game.game_id),
        Some(ArmedTimer {
            round_id: Some(game.round_id),
            kind: TimerKind::Drawing,
        })
    );

    allow_voting(&state).await?;
    let outcome = state
        .engine
        .dispatch(GameCommand::DrawingTimeout {
            game_id: game.game_id,
            round_id: game.round_id,
        })
        .await?;
    assert_eq!(
        outcome,
        CommandOutcome::VotingStarted {
            round_id: game.round_id
        }
    );
    Ok(())
}

// Round state machine: DRAWING_CARDS -> CZAR_VOTING -> ENDED.

use cah_engine::entities::rounds::RoundStatus;
use cah_engine::repos::{picks, rounds};
use cah_engine::services::card_pool;
use cah_engine::services::games as game_service;
use cah_engine::services::rounds::{self as round_service, VotingTransition};
use cah_engine::{AppError, ErrorCode};
use time::{Duration, OffsetDateTime};

use crate::support::fixtures::{create_game, seed_deck};
use crate::support::test_state::{build_test_state, manual_rules};

/// Stored timestamps may lose sub-microsecond precision.
fn close_to(a: OffsetDateTime, b: OffsetDateTime) -> bool {
    (a - b).abs() < Duration::milliseconds(1)
}

#[tokio::test]
async fn create_round_sets_deadline_and_numbers_rounds() -> Result<(), AppError> {
    let rules = manual_rules();
    let (state, _) = build_test_state(rules).await?;
    let deck_id = seed_deck(&state.db, "base", &[1, 1], 30).await?;
    let game_id = create_game(&state, 2, vec![deck_id]).await?.game.id;
    let now = OffsetDateTime::now_utc();

    let first = round_service::create_round(&state.db, game_id, &rules, now).await?;
    assert_eq!(first.round.round_no, 1);
    assert_eq!(first.round.status, RoundStatus::DrawingCards);
    assert_eq!(first.round.prompt_card_id, first.prompt.id);
    assert!(first.round.voting_ends_at.is_none());
    assert!(close_to(first.round.ends_at, now + rules.round_duration));

    let err = round_service::create_round(&state.db, game_id, &rules, now)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::RoundInProgress);

    round_service::transition_to_voting(&state.db, first.round.id, rules.voting_duration, now)
        .await?;
    round_service::close_without_winner(&state.db, first.round.id, now).await?;

    let second = round_service::create_round(&state.db, game_id, &rules, now).await?;
    assert_eq!(second.round.round_no, 2);
    assert_ne!(second.prompt.id, first.prompt.id, "prompts are never reused");
    Ok(())
}

#[tokio::test]
async fn prompt_pool_runs_dry() -> Result<(), AppError> {
    let rules = manual_rules();
    let (state, _) = build_test_state(rules).await?;
    let deck_id = seed_deck(&state.db, "one-prompt", &[1], 30).await?;
    let game_id = create_game(&state, 2, vec![deck_id]).await?.game.id;
    let now = OffsetDateTime::now_utc();

    let start = round_service::create_round(&state.db, game_id, &rules, now).await?;
    round_service::transition_to_voting(&state.db, start.round.id, rules.voting_duration, now)
        .await?;
    round_service::close_without_winner(&state.db, start.round.id, now).await?;

    let err = round_service::create_round(&state.db, game_id, &rules, now)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PromptPoolExhausted);
    assert_eq!(rounds::find_all_by_game(&state.db, game_id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn a_round_needs_two_active_players() -> Result<(), AppError> {
    let rules = manual_rules();
    let (state, _) = build_test_state(rules).await?;
    let deck_id = seed_deck(&state.db, "base", &[1], 30).await?;
    let created = create_game(&state, 2, vec![deck_id]).await?;
    game_service::set_player_active(&state.db, created.players[0].id, false).await?;

    let err = round_service::create_round(
        &state.db,
        created.game.id,
        &rules,
        OffsetDateTime::now_utc(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotEnoughPlayers);
    Ok(())
}

#[tokio::test]
async fn voting_transition_happens_once() -> Result<(), AppError> {
    let rules = manual_rules();
    let (state, _) = build_test_state(rules).await?;
    let deck_id = seed_deck(&state.db, "base", &[1], 30).await?;
    let game_id = create_game(&state, 2, vec![deck_id]).await?.game.id;
    let now = OffsetDateTime::now_utc();
    let start = round_service::create_round(&state.db, game_id, &rules, now).await?;

    let later = now + Duration::seconds(3);
    let first =
        round_service::transition_to_voting(&state.db, start.round.id, rules.voting_duration, later)
            .await?;
    let VotingTransition::Advanced { round, pick_count } = first else {
        panic!("first transition should advance");
    };
    assert_eq!(pick_count, 0);
    assert_eq!(round.status, RoundStatus::CzarVoting);
    assert!(close_to(round.ends_at, later), "drawing deadline freezes at the transition");
    let voting_ends_at = round.voting_ends_at.expect("voting deadline set");
    assert!(close_to(voting_ends_at, later + rules.voting_duration));

    let again =
        round_service::transition_to_voting(&state.db, start.round.id, rules.voting_duration, now)
            .await?;
    assert_eq!(again, VotingTransition::AlreadyAdvanced);
    Ok(())
}

#[tokio::test]
async fn judge_vote_resolves_the_round() -> Result<(), AppError> {
    let rules = manual_rules();
    let (state, _) = build_test_state(rules).await?;
    let deck_id = seed_deck(&state.db, "base", &[1, 1], 40).await?;
    let created = create_game(&state, 3, vec![deck_id]).await?;
    let now = OffsetDateTime::now_utc();
    let start = round_service::create_round(&state.db, created.game.id, &rules, now).await?;
    let round_id = start.round.id;
    let judge = start.round.judge_player_id;
    let others: Vec<i64> = created
        .players
        .iter()
        .map(|p| p.id)
        .filter(|id| *id != judge)
        .collect();

    let mut pick_ids = Vec::new();
    for player in &others {
        let card = card_pool::hand_of(&state.db, *player).await?[0].id;
        pick_ids.push(round_service::submit_pick(&state.db, round_id, *player, &[card]).await?.id);
    }

    // voting has not started
    let err = round_service::resolve(&state.db, pick_ids[0], judge, now)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PhaseMismatch);

    round_service::transition_to_voting(&state.db, round_id, rules.voting_duration, now).await?;

    let err = round_service::resolve(&state.db, pick_ids[0], others[1], now)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotJudge);

    let resolution = round_service::resolve(&state.db, pick_ids[1], judge, now).await?;
    assert_eq!(resolution.winner_player_id, others[1]);
    assert_eq!(resolution.round_no, 1);

    let round = rounds::require_round(&state.db, round_id).await?;
    assert_eq!(round.status, RoundStatus::Ended);
    assert_eq!(round.winner_player_id, Some(others[1]));
    assert!(round.ended_at.is_some());

    let stored = picks::find_by_round(&state.db, round_id).await?;
    let winners: Vec<i64> = stored.iter().filter(|p| p.is_winner).map(|p| p.id).collect();
    assert_eq!(winners, vec![pick_ids[1]]);

    let err = round_service::resolve(&state.db, pick_ids[0], judge, now)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PhaseMismatch);

    assert!(!round_service::close_without_winner(&state.db, round_id, now).await?);
    Ok(())
}

#[tokio::test]
async fn unknown_pick_is_not_found() -> Result<(), AppError> {
    let (state, _) = build_test_state(manual_rules()).await?;
    let err = round_service::resolve(&state.db, 9_999, 1, OffsetDateTime::now_utc())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PickNotFound);
    Ok(())
}

// Command handling and the events each step publishes.

use cah_engine::engine::{
    CommandOutcome, EndReason, GameCommand, GameEndReason, GameEvent, NotifyTarget, TimerKind,
};
use cah_engine::entities::games::GameStatus;
use cah_engine::entities::rounds::RoundStatus;
use cah_engine::repos::{games, picks, rounds};
use cah_engine::{AppError, ErrorCode};

use crate::common::WAIT_LIMIT;
use crate::support::fixtures::{start_game, submit_from_hand};
use crate::support::test_state::{build_test_state, manual_rules, quick_cooldown_rules};
use crate::support::wait::{wait_for, wait_for_events};

#[tokio::test]
async fn start_game_announces_round_and_deals_hands() -> Result<(), AppError> {
    let rules = manual_rules();
    let (state, recorder) = build_test_state(rules).await?;
    let game = start_game(&state, 3, &[1, 1, 1], 40).await?;

    assert_eq!(recorder.count("round_started"), 1);
    let Some(GameEvent::RoundStarted { round }) = recorder.last_of("round_started") else {
        panic!("missing round_started");
    };
    assert_eq!(round.round_id, game.round_id);
    assert_eq!(round.round_no, 1);
    assert_eq!(round.status, RoundStatus::DrawingCards);
    assert!(round.picks.is_empty());

    for player_id in &game.player_ids {
        let dealt = recorder.for_player(*player_id);
        assert_eq!(dealt.len(), 1, "one private hand per player");
        let GameEvent::HandDealt {
            new_card_ids, hand, ..
        } = &dealt[0]
        else {
            panic!("expected hand_dealt, got {:?}", dealt[0]);
        };
        assert_eq!(new_card_ids.len(), rules.hand_size);
        assert_eq!(hand.len(), rules.hand_size);
    }

    let armed = state.engine.timers().armed(game.game_id).expect("drawing timer");
    assert_eq!(armed.kind, TimerKind::Drawing);
    assert_eq!(armed.round_id, Some(game.round_id));
    Ok(())
}

#[tokio::test]
async fn starting_twice_is_rejected() -> Result<(), AppError> {
    let (state, recorder) = build_test_state(manual_rules()).await?;
    let game = start_game(&state, 2, &[1, 1], 30).await?;

    let err = state
        .engine
        .dispatch(GameCommand::StartGame {
            game_id: game.game_id,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameAlreadyStarted);
    assert_eq!(recorder.count("round_started"), 1);
    Ok(())
}

#[tokio::test]
async fn last_pick_moves_the_round_to_voting() -> Result<(), AppError> {
    let (state, recorder) = build_test_state(manual_rules()).await?;
    let game = start_game(&state, 3, &[1, 1], 40).await?;
    let submitters = game.submitters(&state).await?;

    let first = submit_from_hand(&state, game.round_id, submitters[0], 1).await?;
    assert!(matches!(
        first,
        CommandOutcome::PickAccepted {
            voting_started: false,
            ..
        }
    ));
    assert_eq!(recorder.count("round_ended"), 0);

    let last = submit_from_hand(&state, game.round_id, submitters[1], 1).await?;
    assert!(matches!(
        last,
        CommandOutcome::PickAccepted {
            voting_started: true,
            ..
        }
    ));

    let submitted: Vec<(usize, usize)> = recorder
        .of("pick_submitted")
        .into_iter()
        .map(|e| match e {
            GameEvent::PickSubmitted {
                submitted,
                expected,
                ..
            } => (submitted, expected),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(submitted, vec![(1, 2), (2, 2)]);

    let Some(GameEvent::RoundEnded { reason, round }) = recorder.last_of("round_ended") else {
        panic!("missing round_ended");
    };
    assert_eq!(reason, EndReason::AllPlayed);
    assert_eq!(round.status, RoundStatus::CzarVoting);
    assert_eq!(round.picks.len(), 2);
    assert!(round.picks.iter().all(|p| p.player_id.is_none()));

    let armed = state.engine.timers().armed(game.game_id).expect("voting timer");
    assert_eq!(armed.kind, TimerKind::Voting);
    Ok(())
}

#[tokio::test]
async fn rejected_command_publishes_nothing() -> Result<(), AppError> {
    let (state, recorder) = build_test_state(manual_rules()).await?;
    let game = start_game(&state, 3, &[1, 1], 40).await?;
    let judge = game.judge(&state).await?;
    recorder.clear();

    let err = submit_from_hand(&state, game.round_id, judge, 1)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::JudgeCannotSubmit);
    assert!(recorder.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn vote_resolves_and_next_round_follows_cooldown() -> Result<(), AppError> {
    let (state, recorder) = build_test_state(quick_cooldown_rules()).await?;
    let game = start_game(&state, 3, &[1, 1, 1], 40).await?;
    let judge = game.judge(&state).await?;
    for player_id in game.submitters(&state).await? {
        submit_from_hand(&state, game.round_id, player_id, 1).await?;
    }
    let pick = picks::find_by_round(&state.db, game.round_id).await?[0].clone();

    let outcome = state
        .engine
        .dispatch(GameCommand::CastVote {
            judge_player_id: judge,
            round_pick_id: pick.id,
        })
        .await?;
    assert_eq!(
        outcome,
        CommandOutcome::RoundResolved {
            round_id: game.round_id,
            winner_player_id: pick.player_id,
            game_winner_player_id: None,
        }
    );

    let Some(GameEvent::RoundResolved {
        winner_player_id,
        points,
        ..
    }) = recorder.last_of("round_resolved")
    else {
        panic!("missing round_resolved");
    };
    assert_eq!(winner_player_id, pick.player_id);
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].points, 1);

    assert!(wait_for_events(&recorder, "round_started", 2, WAIT_LIMIT).await);
    let latest = rounds::find_latest_by_game(&state.db, game.game_id)
        .await?
        .expect("second round");
    assert_eq!(latest.round_no, 2);
    assert_ne!(latest.judge_player_id, judge);
    Ok(())
}

#[tokio::test]
async fn vote_from_a_non_judge_is_rejected() -> Result<(), AppError> {
    let (state, _) = build_test_state(manual_rules()).await?;
    let game = start_game(&state, 3, &[1, 1], 40).await?;
    let submitters = game.submitters(&state).await?;
    for player_id in &submitters {
        submit_from_hand(&state, game.round_id, *player_id, 1).await?;
    }
    let pick = picks::find_by_round(&state.db, game.round_id).await?[0].clone();
    let voter = if pick.player_id == submitters[0] {
        submitters[1]
    } else {
        submitters[0]
    };

    let err = state
        .engine
        .dispatch(GameCommand::CastVote {
            judge_player_id: voter,
            round_pick_id: pick.id,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotJudge);
    Ok(())
}

#[tokio::test]
async fn leaving_player_completes_the_drawing_phase() -> Result<(), AppError> {
    let (state, recorder) = build_test_state(manual_rules()).await?;
    let game = start_game(&state, 3, &[1, 1], 40).await?;
    let submitters = game.submitters(&state).await?;
    submit_from_hand(&state, game.round_id, submitters[0], 1).await?;

    let outcome = state
        .engine
        .dispatch(GameCommand::PlayerLeft {
            player_id: submitters[1],
        })
        .await?;
    assert_eq!(
        outcome,
        CommandOutcome::PlayerDeactivated {
            player_id: submitters[1]
        }
    );

    let round = rounds::require_round(&state.db, game.round_id).await?;
    assert_eq!(round.status, RoundStatus::CzarVoting);
    let Some(GameEvent::RoundEnded { reason, .. }) = recorder.last_of("round_ended") else {
        panic!("missing round_ended");
    };
    assert_eq!(reason, EndReason::AllPlayed);
    Ok(())
}

#[tokio::test]
async fn game_ends_when_too_few_players_remain() -> Result<(), AppError> {
    let (state, recorder) = build_test_state(quick_cooldown_rules()).await?;
    let game = start_game(&state, 2, &[1, 1, 1], 30).await?;
    let submitter = game.submitters(&state).await?[0];

    // the only submitter leaves: nothing to vote on, the round is skipped,
    // and the next round cannot start
    state
        .engine
        .dispatch(GameCommand::PlayerLeft {
            player_id: submitter,
        })
        .await?;

    assert!(wait_for_events(&recorder, "game_ended", 1, WAIT_LIMIT).await);
    assert_eq!(recorder.count("round_skipped"), 1);
    let Some(GameEvent::GameEnded {
        winner_player_id,
        reason,
    }) = recorder.last_of("game_ended")
    else {
        panic!("missing game_ended");
    };
    assert_eq!(winner_player_id, None);
    assert_eq!(reason, GameEndReason::NotEnoughPlayers);

    let stored = games::require_game(&state.db, game.game_id).await?;
    assert_eq!(stored.status, GameStatus::Ended);
    assert!(wait_for(WAIT_LIMIT, || state.engine.timers().armed(game.game_id).is_none()).await);
    Ok(())
}

#[tokio::test]
async fn game_ends_when_prompts_run_out() -> Result<(), AppError> {
    let (state, recorder) = build_test_state(quick_cooldown_rules()).await?;
    let game = start_game(&state, 2, &[1], 30).await?;

    let outcome = state
        .engine
        .dispatch(GameCommand::DrawingTimeout {
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

    assert!(wait_for_events(&recorder, "game_ended", 1, WAIT_LIMIT).await);
    let Some(GameEvent::GameEnded { reason, .. }) = recorder.last_of("game_ended") else {
        panic!("missing game_ended");
    };
    assert_eq!(reason, GameEndReason::NoPromptsLeft);

    let game_events: Vec<NotifyTarget> = recorder
        .events()
        .into_iter()
        .filter(|(_, e)| e.name() == "game_ended")
        .map(|(t, _)| t)
        .collect();
    assert_eq!(game_events, vec![NotifyTarget::Game(game.game_id)]);
    Ok(())
}

#[tokio::test]
async fn authorize_checks_game_membership() -> Result<(), AppError> {
    let (state, _) = build_test_state(manual_rules()).await?;
    let game = start_game(&state, 2, &[1], 30).await?;

    let player = state
        .engine
        .authorize(game.game_id, game.player_ids[0])
        .await?;
    assert_eq!(player.game_id, game.game_id);

    let err = state
        .engine
        .authorize(game.game_id + 1, game.player_ids[0])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotAMember);
    Ok(())
}

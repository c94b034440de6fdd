// What a reconnecting client sees.

use cah_engine::engine::GameCommand;
use cah_engine::entities::games::GameStatus;
use cah_engine::entities::rounds::RoundStatus;
use cah_engine::repos::picks;
use cah_engine::{AppError, ErrorCode};
use serde_json::json;

use crate::support::fixtures::{start_game, submit_all, submit_from_hand};
use crate::support::test_state::{build_test_state, manual_rules};

#[tokio::test]
async fn drawing_snapshot_lists_submitters_but_no_picks() -> Result<(), AppError> {
    let rules = manual_rules();
    let (state, _) = build_test_state(rules).await?;
    let game = start_game(&state, 3, &[1, 1], 40).await?;
    let submitter = game.submitters(&state).await?[0];
    submit_from_hand(&state, game.round_id, submitter, 1).await?;

    let snapshot = state.engine.snapshot(game.game_id).await?;
    assert_eq!(snapshot.status, GameStatus::Playing);
    assert_eq!(snapshot.win_threshold, rules.win_threshold);
    assert_eq!(snapshot.players.len(), 3);
    assert!(snapshot.players.iter().all(|p| p.points == 0 && p.is_active));

    let round = snapshot.round.expect("open round");
    assert_eq!(round.status, RoundStatus::DrawingCards);
    assert_eq!(round.submitted_player_ids, vec![submitter]);
    assert!(round.picks.is_empty());
    assert!(round.voting_ends_at.is_none());
    Ok(())
}

#[tokio::test]
async fn authors_are_revealed_only_after_the_vote() -> Result<(), AppError> {
    let (state, _) = build_test_state(manual_rules()).await?;
    let game = start_game(&state, 3, &[1, 1], 40).await?;
    submit_all(&state, &game).await?;

    let voting = state.engine.snapshot(game.game_id).await?.round.expect("round");
    assert_eq!(voting.status, RoundStatus::CzarVoting);
    assert_eq!(voting.picks.len(), 2);
    assert!(voting.voting_ends_at.is_some());
    for pick in &voting.picks {
        assert_eq!(pick.player_id, None);
        assert_eq!(pick.answer_cards.len(), 1);
        assert!(!pick.is_winner);
    }

    let winner = picks::find_by_round(&state.db, game.round_id).await?[1].clone();
    state
        .engine
        .dispatch(GameCommand::CastVote {
            judge_player_id: game.judge(&state).await?,
            round_pick_id: winner.id,
        })
        .await?;

    let snapshot = state.engine.snapshot(game.game_id).await?;
    let ended = snapshot.round.expect("round");
    assert_eq!(ended.status, RoundStatus::Ended);
    assert_eq!(ended.winner_player_id, Some(winner.player_id));
    assert!(ended.picks.iter().all(|p| p.player_id.is_some()));
    let marked: Vec<i64> = ended
        .picks
        .iter()
        .filter(|p| p.is_winner)
        .map(|p| p.round_pick_id)
        .collect();
    assert_eq!(marked, vec![winner.id]);

    let points = snapshot
        .players
        .iter()
        .find(|p| p.player_id == winner.player_id)
        .map(|p| p.points);
    assert_eq!(points, Some(1));
    Ok(())
}

#[tokio::test]
async fn snapshot_serializes_with_wire_names() -> Result<(), AppError> {
    let (state, _) = build_test_state(manual_rules()).await?;
    let game = start_game(&state, 2, &[1], 30).await?;

    let value = serde_json::to_value(state.engine.snapshot(game.game_id).await?)
        .expect("snapshot serializes");
    assert_eq!(value["status"], json!("PLAYING"));
    assert_eq!(value["round"]["status"], json!("DRAWING_CARDS"));
    assert_eq!(value["round"]["round_no"], json!(1));
    assert!(value["round"]["ends_at"].is_i64());
    assert!(value["round"]["prompt"]["content"].is_string());
    Ok(())
}

#[tokio::test]
async fn snapshot_of_unknown_game_is_not_found() -> Result<(), AppError> {
    let (state, _) = build_test_state(manual_rules()).await?;
    let err = state.engine.snapshot(424_242).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameNotFound);
    Ok(())
}

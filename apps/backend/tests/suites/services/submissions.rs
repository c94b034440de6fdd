// Pick submission validation.

use cah_engine::repos::picks;
use cah_engine::repos::rounds::Round;
use cah_engine::services::games as game_service;
use cah_engine::services::{card_pool, rounds as round_service};
use cah_engine::state::app_state::AppState;
use cah_engine::{AppError, ErrorCode};
use time::OffsetDateTime;

use crate::support::fixtures::{create_game, seed_deck};
use crate::support::test_state::{build_test_state, manual_rules};

struct OpenRound {
    state: AppState,
    round: Round,
    judge: i64,
    /// Non-judge players in join order
    others: Vec<i64>,
}

async fn open_round(prompt_pick: u8) -> Result<OpenRound, AppError> {
    let rules = manual_rules();
    let (state, _) = build_test_state(rules).await?;
    let deck_id = seed_deck(&state.db, "base", &[prompt_pick; 3], 40).await?;
    let created = create_game(&state, 3, vec![deck_id]).await?;
    let start = round_service::create_round(
        &state.db,
        created.game.id,
        &rules,
        OffsetDateTime::now_utc(),
    )
    .await?;
    let judge = start.round.judge_player_id;
    let others = created
        .players
        .iter()
        .map(|p| p.id)
        .filter(|id| *id != judge)
        .collect();
    Ok(OpenRound {
        state,
        round: start.round,
        judge,
        others,
    })
}

async fn hand_ids(state: &AppState, player_id: i64) -> Result<Vec<i64>, AppError> {
    Ok(card_pool::hand_of(&state.db, player_id)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect())
}

#[tokio::test]
async fn valid_pick_is_recorded_and_leaves_the_hand() -> Result<(), AppError> {
    let r = open_round(2).await?;
    let player = r.others[0];
    let hand = hand_ids(&r.state, player).await?;

    let pick = round_service::submit_pick(&r.state.db, r.round.id, player, &hand[..2]).await?;
    assert_eq!(pick.answer_card_ids, hand[..2].to_vec());
    assert!(!pick.is_winner);

    let after = hand_ids(&r.state, player).await?;
    assert_eq!(after.len(), hand.len() - 2);
    assert!(!after.contains(&hand[0]) && !after.contains(&hand[1]));

    let status = round_service::submission_status(&r.state.db, &r.round).await?;
    assert_eq!(status.submitted, vec![player]);
    assert_eq!(status.expected, r.others);
    assert!(!status.is_complete());
    Ok(())
}

#[tokio::test]
async fn judge_cannot_submit() -> Result<(), AppError> {
    let r = open_round(1).await?;
    let hand = hand_ids(&r.state, r.judge).await?;

    let err = round_service::submit_pick(&r.state.db, r.round.id, r.judge, &hand[..1])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::JudgeCannotSubmit);
    Ok(())
}

#[tokio::test]
async fn second_submission_is_rejected() -> Result<(), AppError> {
    let r = open_round(1).await?;
    let player = r.others[0];
    let hand = hand_ids(&r.state, player).await?;

    round_service::submit_pick(&r.state.db, r.round.id, player, &hand[..1]).await?;
    let err = round_service::submit_pick(&r.state.db, r.round.id, player, &hand[1..2])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AlreadySubmitted);
    assert_eq!(picks::find_by_round(&r.state.db, r.round.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn card_count_must_match_the_prompt() -> Result<(), AppError> {
    let r = open_round(2).await?;
    let player = r.others[0];
    let hand = hand_ids(&r.state, player).await?;

    for cards in [&hand[..1], &hand[..3]] {
        let err = round_service::submit_pick(&r.state.db, r.round.id, player, cards)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::WrongCardCount);
    }
    Ok(())
}

#[tokio::test]
async fn duplicate_cards_are_rejected() -> Result<(), AppError> {
    let r = open_round(2).await?;
    let player = r.others[0];
    let card = hand_ids(&r.state, player).await?[0];

    let err = round_service::submit_pick(&r.state.db, r.round.id, player, &[card, card])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::DuplicateCard);
    Ok(())
}

#[tokio::test]
async fn cards_must_come_from_own_hand() -> Result<(), AppError> {
    let r = open_round(1).await?;
    let foreign = hand_ids(&r.state, r.others[1]).await?[0];

    let err = round_service::submit_pick(&r.state.db, r.round.id, r.others[0], &[foreign])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CardNotInHand);
    // nothing moved
    assert!(hand_ids(&r.state, r.others[1]).await?.contains(&foreign));
    Ok(())
}

#[tokio::test]
async fn inactive_player_cannot_submit() -> Result<(), AppError> {
    let r = open_round(1).await?;
    let player = r.others[0];
    let hand = hand_ids(&r.state, player).await?;
    game_service::set_player_active(&r.state.db, player, false).await?;

    let err = round_service::submit_pick(&r.state.db, r.round.id, player, &hand[..1])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PlayerInactive);

    let status = round_service::submission_status(&r.state.db, &r.round).await?;
    assert_eq!(status.expected, vec![r.others[1]]);
    Ok(())
}

#[tokio::test]
async fn player_of_another_game_is_not_found() -> Result<(), AppError> {
    let r = open_round(1).await?;
    let deck_id = seed_deck(&r.state.db, "other", &[1], 10).await?;
    let stranger = create_game(&r.state, 2, vec![deck_id]).await?.players[0].id;

    let err = round_service::submit_pick(&r.state.db, r.round.id, stranger, &[1])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PlayerNotFound);
    Ok(())
}

#[tokio::test]
async fn picks_are_refused_once_voting_starts() -> Result<(), AppError> {
    let r = open_round(1).await?;
    let player = r.others[0];
    let hand = hand_ids(&r.state, player).await?;
    round_service::transition_to_voting(
        &r.state.db,
        r.round.id,
        manual_rules().voting_duration,
        OffsetDateTime::now_utc(),
    )
    .await?;

    let err = round_service::submit_pick(&r.state.db, r.round.id, player, &hand[..1])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PhaseMismatch);
    Ok(())
}

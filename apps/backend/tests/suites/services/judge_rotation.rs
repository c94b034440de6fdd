// Judge rotation: everyone judges before anyone judges twice.

use std::collections::HashSet;

use cah_engine::config::game::GameRules;
use cah_engine::services::games as game_service;
use cah_engine::services::{judge_rotation, rounds as round_service};
use cah_engine::state::app_state::AppState;
use cah_engine::AppError;
use time::OffsetDateTime;

use crate::support::fixtures::{create_game, seed_deck};
use crate::support::test_state::{build_test_state, manual_rules};

/// Open a round and close it at once; returns the judge.
async fn play_empty_round(
    state: &AppState,
    game_id: i64,
    rules: &GameRules,
) -> Result<i64, AppError> {
    let now = OffsetDateTime::now_utc();
    let start = round_service::create_round(&state.db, game_id, rules, now).await?;
    round_service::transition_to_voting(&state.db, start.round.id, rules.voting_duration, now)
        .await?;
    round_service::close_without_winner(&state.db, start.round.id, now).await?;
    Ok(start.round.judge_player_id)
}

#[tokio::test]
async fn each_player_judges_once_per_cycle() -> Result<(), AppError> {
    let rules = manual_rules();
    let (state, _) = build_test_state(rules).await?;
    let deck_id = seed_deck(&state.db, "base", &[1; 10], 80).await?;
    let created = create_game(&state, 4, vec![deck_id]).await?;
    let game_id = created.game.id;

    let mut judges = Vec::new();
    for _ in 0..8 {
        judges.push(play_empty_round(&state, game_id, &rules).await?);
    }

    let first: HashSet<i64> = judges[..4].iter().copied().collect();
    let second: HashSet<i64> = judges[4..].iter().copied().collect();
    let everyone: HashSet<i64> = created.players.iter().map(|p| p.id).collect();
    assert_eq!(first, everyone);
    assert_eq!(second, everyone);

    // least recently judged goes first once everyone had a turn
    assert_eq!(judges[4..], judges[..4]);
    Ok(())
}

#[tokio::test]
async fn inactive_players_never_judge() -> Result<(), AppError> {
    let rules = manual_rules();
    let (state, _) = build_test_state(rules).await?;
    let deck_id = seed_deck(&state.db, "base", &[1; 6], 60).await?;
    let created = create_game(&state, 3, vec![deck_id]).await?;
    let game_id = created.game.id;
    let away = created.players[1].id;
    game_service::set_player_active(&state.db, away, false).await?;

    for _ in 0..4 {
        let judge = play_empty_round(&state, game_id, &rules).await?;
        assert_ne!(judge, away);
    }

    let histories = judge_rotation::judge_histories(&state.db, game_id).await?;
    assert_eq!(histories.len(), 2);
    assert!(histories.iter().all(|h| h.last_judged_round.is_some()));
    Ok(())
}

#[tokio::test]
async fn returning_player_is_preferred_as_never_judged() -> Result<(), AppError> {
    let rules = manual_rules();
    let (state, _) = build_test_state(rules).await?;
    let deck_id = seed_deck(&state.db, "base", &[1; 6], 60).await?;
    let created = create_game(&state, 3, vec![deck_id]).await?;
    let game_id = created.game.id;
    let late = created.players[2].id;
    game_service::set_player_active(&state.db, late, false).await?;

    play_empty_round(&state, game_id, &rules).await?;
    play_empty_round(&state, game_id, &rules).await?;

    game_service::set_player_active(&state.db, late, true).await?;
    assert_eq!(play_empty_round(&state, game_id, &rules).await?, late);
    Ok(())
}

#[tokio::test]
async fn selection_is_reproducible_for_a_seed() -> Result<(), AppError> {
    let rules = manual_rules();
    let (state, _) = build_test_state(rules).await?;
    let deck_id = seed_deck(&state.db, "base", &[1; 4], 40).await?;
    let created = create_game(&state, 4, vec![deck_id]).await?;
    let game = &created.game;

    let a = judge_rotation::select_next_judge(&state.db, game.id, game.rng_seed, 1).await?;
    let b = judge_rotation::select_next_judge(&state.db, game.id, game.rng_seed, 1).await?;
    assert_eq!(a, b);
    Ok(())
}

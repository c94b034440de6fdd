// Transaction wrapper: commit on success, rollback on error.

use cah_engine::db::txn::with_txn;
use cah_engine::entities::decks;
use cah_engine::repos::decks as deck_repo;
use cah_engine::{AppError, ErrorCode};
use sea_orm::{EntityTrait, PaginatorTrait};

use crate::support::test_state::{build_test_state, manual_rules};

#[tokio::test]
async fn commits_body_writes_on_ok() -> Result<(), AppError> {
    let (state, _) = build_test_state(manual_rules()).await?;

    let deck_id = with_txn(&state.db, |txn| {
        Box::pin(async move { Ok(deck_repo::create_deck(txn, "committed").await?) })
    })
    .await?;

    let deck = decks::Entity::find_by_id(deck_id).one(&state.db).await?;
    assert_eq!(deck.map(|d| d.name).as_deref(), Some("committed"));
    Ok(())
}

#[tokio::test]
async fn rolls_back_and_keeps_body_error() -> Result<(), AppError> {
    let (state, _) = build_test_state(manual_rules()).await?;

    let err = with_txn(&state.db, |txn| {
        Box::pin(async move {
            deck_repo::create_deck(txn, "discarded").await?;
            Err::<(), _>(AppError::bad_request(ErrorCode::BadRequest, "body failed"))
        })
    })
    .await
    .unwrap_err();

    assert_eq!(err.code(), ErrorCode::BadRequest);
    assert_eq!(decks::Entity::find().count(&state.db).await?, 0);
    Ok(())
}

//! Hand repository functions: the cards each player currently holds.

use std::collections::BTreeMap;

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::hands_sea as hands_adapter;
use crate::errors::domain::DomainError;

/// Insert newly dealt cards. `deal` maps player id to the card ids they get.
pub async fn insert_deal<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    deal: &BTreeMap<i64, Vec<i64>>,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    let cards = deal
        .iter()
        .flat_map(|(player_id, card_ids)| {
            card_ids.iter().map(|card_id| hands_adapter::HandCardCreate {
                player_id: *player_id,
                answer_card_id: *card_id,
            })
        })
        .collect();

    hands_adapter::insert_deal(
        conn,
        hands_adapter::DealCreate {
            game_id,
            dealt_at: now,
            cards,
        },
    )
    .await?;
    Ok(())
}

/// Card ids a player holds, in dealing order.
pub async fn card_ids_of<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Vec<i64>, DomainError> {
    let rows = hands_adapter::find_by_player(conn, player_id).await?;
    Ok(rows.into_iter().map(|r| r.answer_card_id).collect())
}

/// Hand sizes per player for a game. Players holding nothing are absent.
pub async fn sizes_by_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<BTreeMap<i64, usize>, DomainError> {
    let rows = hands_adapter::find_by_game(conn, game_id).await?;
    let mut sizes = BTreeMap::new();
    for row in rows {
        *sizes.entry(row.player_id).or_insert(0) += 1;
    }
    Ok(sizes)
}

/// Every held card id of a game.
pub async fn held_ids_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<i64>, DomainError> {
    let rows = hands_adapter::find_by_game(conn, game_id).await?;
    Ok(rows.into_iter().map(|r| r.answer_card_id).collect())
}

/// Remove played cards from a player's hand. Returns how many were removed.
pub async fn remove_cards<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    card_ids: &[i64],
) -> Result<u64, DomainError> {
    Ok(hands_adapter::remove_cards(conn, player_id, card_ids).await?)
}

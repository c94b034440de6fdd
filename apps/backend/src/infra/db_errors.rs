//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return `sea_orm::DbErr`; repos convert here so that the unique
//! indexes guarding the card and round invariants surface as typed conflicts.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Unique indexes and the conflict each one signals. SQLite reports the
/// violated columns ("UNIQUE constraint failed: hand_cards.game_id, ..."),
/// Postgres reports the index name.
const UNIQUE_CONSTRAINTS: &[(&str, &str, ConflictKind, &str)] = &[
    (
        "ux_hand_cards_game_card",
        "hand_cards.answer_card_id",
        ConflictKind::CardAlreadyHeld,
        "Card is already held by a player in this game",
    ),
    (
        "ux_pick_cards_game_card",
        "pick_cards.answer_card_id",
        ConflictKind::CardAlreadyPlayed,
        "Card was already played in this game",
    ),
    (
        "ux_rounds_game_prompt",
        "rounds.prompt_card_id",
        ConflictKind::PromptAlreadyUsed,
        "Prompt was already drawn in this game",
    ),
    (
        "ux_rounds_game_round_no",
        "rounds.round_no",
        ConflictKind::DuplicateRound,
        "Round number already exists for this game",
    ),
    (
        "ux_round_picks_round_player",
        "round_picks.player_id",
        ConflictKind::DuplicateSubmission,
        "Player already submitted for this round",
    ),
    (
        "ux_players_game_room_user",
        "players.room_user_id",
        ConflictKind::DuplicatePlayer,
        "Room member already has a player in this game",
    ),
];

fn unique_conflict(error_msg: &str) -> Option<(ConflictKind, &'static str)> {
    UNIQUE_CONSTRAINTS
        .iter()
        .find(|(index, column, _, _)| error_msg.contains(index) || error_msg.contains(column))
        .map(|(_, _, kind, detail)| (kind.clone(), *detail))
}

/// Translate a `DbErr` into a `DomainError`.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();

    match &e {
        sea_orm::DbErr::RecordNotFound(what) => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), what.clone());
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(raw_error = %error_msg, "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(raw_error = %error_msg, "Unique constraint violation");
        if let Some((kind, detail)) = unique_conflict(&error_msg) {
            return DomainError::conflict(kind, detail);
        }
        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&error_msg, "40001") || error_msg.contains("could not serialize access")
    {
        warn!(raw_error = %error_msg, "Serialization failure");
        return DomainError::conflict(
            ConflictKind::SerializationFailure,
            "Concurrent update detected; retry the operation",
        );
    }

    if mentions_sqlstate(&error_msg, "23503") || error_msg.contains("FOREIGN KEY constraint failed")
    {
        warn!(raw_error = %error_msg, "Foreign key constraint violation");
        return DomainError::infra(
            InfraErrorKind::DataCorruption,
            "Foreign key constraint violation",
        );
    }

    if error_msg.contains("database is locked")
        || error_msg.contains("timeout")
        || error_msg.contains("timed out")
    {
        warn!(raw_error = %error_msg, "Database timeout or lock contention");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(raw_error = %error_msg, "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}

use serde::{Deserialize, Serialize};

use crate::engine::GameEvent;
use crate::error::{AppError, ErrorKind};
use crate::repos::decks::AnswerCard;
use crate::services::games::GameSnapshot;

pub const PROTOCOL_VERSION: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Hello {
        protocol: i32,
    },
    /// Bind this connection to a player of a game.
    Join {
        game_id: i64,
        player_id: i64,
    },
    SubmitPick {
        round_id: i64,
        answer_card_ids: Vec<i64>,
    },
    CastVote {
        round_pick_id: i64,
    },
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    HelloAck {
        protocol: i32,
    },
    Joined {
        game: GameSnapshot,
        hand: Vec<AnswerCard>,
    },
    Ack {
        message: &'static str,
    },
    /// Engine event. The event's own fields sit next to `game_id`.
    Event {
        game_id: i64,
        #[serde(flatten)]
        event: GameEvent,
    },
    Error {
        kind: ErrorKind,
        code: String,
        message: String,
    },
}

impl ServerMsg {
    pub fn error(kind: ErrorKind, code: &str, message: impl Into<String>) -> Self {
        ServerMsg::Error {
            kind,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl From<&AppError> for ServerMsg {
    fn from(err: &AppError) -> Self {
        ServerMsg::error(err.kind(), err.code().as_str(), err.detail())
    }
}

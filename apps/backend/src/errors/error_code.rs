//! Error codes for the round engine.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in problem+json bodies and websocket error frames.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Identity
    /// Session has not joined a game, or joined a different one
    Unauthorized,
    /// Player does not belong to the game
    NotAMember,

    // Request Validation
    /// General bad request error
    BadRequest,
    /// Malformed client message
    MalformedMessage,
    /// Operation not valid in the current round phase
    PhaseMismatch,
    /// The judge tried to submit cards
    JudgeCannotSubmit,
    /// Player already submitted this round
    AlreadySubmitted,
    /// Submission card count differs from the prompt's pick
    WrongCardCount,
    /// Same card listed twice in a submission
    DuplicateCard,
    /// Submitted card is not in the player's hand
    CardNotInHand,
    /// Vote cast by someone other than the round's judge
    NotJudge,
    /// Judge voted for their own submission
    SelfVote,
    /// Player is marked inactive
    PlayerInactive,
    /// Fewer active players than a round needs
    NotEnoughPlayers,
    /// StartGame on a game that already has rounds
    GameAlreadyStarted,
    /// Rejected game setup
    InvalidGameSetup,

    // Resource Not Found
    GameNotFound,
    PlayerNotFound,
    RoundNotFound,
    PickNotFound,
    DeckNotFound,
    /// General not found error
    NotFound,

    // Conflicts
    /// A round is already open for the game
    RoundInProgress,
    CardAlreadyHeld,
    CardAlreadyPlayed,
    PromptAlreadyUsed,
    DuplicateRound,
    DuplicateSubmission,
    DuplicatePlayer,
    /// Serializable transaction aborted by the database
    SerializationFailure,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // Card pools
    AnswerPoolExhausted,
    PromptPoolExhausted,

    // System Errors
    DbUnavailable,
    DbTimeout,
    DataCorruption,
    InvariantViolation,
    ConfigError,
    Internal,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotAMember => "NOT_A_MEMBER",

            Self::BadRequest => "BAD_REQUEST",
            Self::MalformedMessage => "MALFORMED_MESSAGE",
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::JudgeCannotSubmit => "JUDGE_CANNOT_SUBMIT",
            Self::AlreadySubmitted => "ALREADY_SUBMITTED",
            Self::WrongCardCount => "WRONG_CARD_COUNT",
            Self::DuplicateCard => "DUPLICATE_CARD",
            Self::CardNotInHand => "CARD_NOT_IN_HAND",
            Self::NotJudge => "NOT_JUDGE",
            Self::SelfVote => "SELF_VOTE",
            Self::PlayerInactive => "PLAYER_INACTIVE",
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            Self::InvalidGameSetup => "INVALID_GAME_SETUP",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::RoundNotFound => "ROUND_NOT_FOUND",
            Self::PickNotFound => "PICK_NOT_FOUND",
            Self::DeckNotFound => "DECK_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::RoundInProgress => "ROUND_IN_PROGRESS",
            Self::CardAlreadyHeld => "CARD_ALREADY_HELD",
            Self::CardAlreadyPlayed => "CARD_ALREADY_PLAYED",
            Self::PromptAlreadyUsed => "PROMPT_ALREADY_USED",
            Self::DuplicateRound => "DUPLICATE_ROUND",
            Self::DuplicateSubmission => "DUPLICATE_SUBMISSION",
            Self::DuplicatePlayer => "DUPLICATE_PLAYER",
            Self::SerializationFailure => "SERIALIZATION_FAILURE",
            Self::Conflict => "CONFLICT",

            Self::AnswerPoolExhausted => "ANSWER_POOL_EXHAUSTED",
            Self::PromptPoolExhausted => "PROMPT_POOL_EXHAUSTED",

            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::InvariantViolation => "INVARIANT_VIOLATION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Domain-level error type used across services and adapters.
//!
//! This error type is HTTP- and DB-agnostic. Services return
//! `Result<T, DomainError>`; the engine surface converts into
//! `crate::error::AppError` through `From<DomainError> for AppError`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    DbUnavailable,
    DataCorruption,
    Other(String),
}

/// Rule violations a caller can fix by sending a different request
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    /// The round (or game) is not in the phase the operation needs
    PhaseMismatch,
    JudgeCannotSubmit,
    AlreadySubmitted,
    WrongCardCount,
    DuplicateCard,
    CardNotInHand,
    /// Only the round's judge may cast the vote
    NotJudge,
    SelfVote,
    PlayerInactive,
    NotEnoughPlayers,
    GameAlreadyStarted,
    InvalidGameSetup,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Game,
    Player,
    Round,
    Pick,
    Deck,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    RoundInProgress,
    CardAlreadyHeld,
    CardAlreadyPlayed,
    PromptAlreadyUsed,
    DuplicateRound,
    DuplicateSubmission,
    DuplicatePlayer,
    SerializationFailure,
    Other(String),
}

/// Which card pool ran dry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    AnswerCards,
    PromptCards,
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    Validation(ValidationKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Semantic conflict (lost race, unique index hit)
    Conflict(ConflictKind, String),
    /// Not enough undealt cards or prompts left for the game
    PoolExhausted(PoolKind, String),
    /// Broken internal contract; a programming error, never user input
    Invariant(String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::PoolExhausted(kind, d) => write!(f, "pool exhausted {kind:?}: {d}"),
            DomainError::Invariant(d) => write!(f, "invariant violation: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn pool_exhausted(kind: PoolKind, detail: impl Into<String>) -> Self {
        Self::PoolExhausted(kind, detail.into())
    }
    pub fn invariant(detail: impl Into<String>) -> Self {
        Self::Invariant(detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// Shorthand for the most common rejection: wrong round phase.
    pub fn phase_mismatch(detail: impl Into<String>) -> Self {
        Self::Validation(ValidationKind::PhaseMismatch, detail.into())
    }
}

use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, PoolKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::infra::db_errors::map_db_err;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
}

/// Coarse error class a realtime client branches on: redirect for
/// `NotFound`, re-join for `Unauthorized`, show a message otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    BadRequest,
    Internal,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Unauthorized: {detail}")]
    Unauthorized { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Pool exhausted: {detail}")]
    PoolExhausted { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Database unavailable")]
    DbUnavailable,
    #[error("Database timeout: {detail}")]
    Timeout { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::BadRequest { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Unauthorized { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::PoolExhausted { code, .. }
            | AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::DbUnavailable => ErrorCode::DbUnavailable,
            AppError::Timeout { .. } => ErrorCode::DbTimeout,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            AppError::BadRequest { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Unauthorized { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::PoolExhausted { detail, .. }
            | AppError::Internal { detail, .. }
            | AppError::Config { detail }
            | AppError::Timeout { detail } => detail.clone(),
            AppError::DbUnavailable => "Database unavailable".to_string(),
        }
    }

    /// Failures worth running the same command again for: the database was
    /// unreachable, slow, lost a serialization race, or failed in a way the
    /// mapping does not recognise.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::DbUnavailable | AppError::Timeout { .. } => true,
            AppError::Conflict { code, .. } => *code == ErrorCode::SerializationFailure,
            AppError::Internal { code, .. } => *code == ErrorCode::Internal,
            _ => false,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::PoolExhausted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::DbUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Classification used by the websocket error frame.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::Unauthorized { .. } => ErrorKind::Unauthorized,
            AppError::BadRequest { .. }
            | AppError::Conflict { .. }
            | AppError::PoolExhausted { .. } => ErrorKind::BadRequest,
            AppError::Internal { .. }
            | AppError::Config { .. }
            | AppError::DbUnavailable
            | AppError::Timeout { .. } => ErrorKind::Internal,
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::Internal,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn validation_code(kind: &ValidationKind) -> ErrorCode {
    match kind {
        ValidationKind::PhaseMismatch => ErrorCode::PhaseMismatch,
        ValidationKind::JudgeCannotSubmit => ErrorCode::JudgeCannotSubmit,
        ValidationKind::AlreadySubmitted => ErrorCode::AlreadySubmitted,
        ValidationKind::WrongCardCount => ErrorCode::WrongCardCount,
        ValidationKind::DuplicateCard => ErrorCode::DuplicateCard,
        ValidationKind::CardNotInHand => ErrorCode::CardNotInHand,
        ValidationKind::NotJudge => ErrorCode::NotJudge,
        ValidationKind::SelfVote => ErrorCode::SelfVote,
        ValidationKind::PlayerInactive => ErrorCode::PlayerInactive,
        ValidationKind::NotEnoughPlayers => ErrorCode::NotEnoughPlayers,
        ValidationKind::GameAlreadyStarted => ErrorCode::GameAlreadyStarted,
        ValidationKind::InvalidGameSetup => ErrorCode::InvalidGameSetup,
        _ => ErrorCode::BadRequest,
    }
}

fn not_found_code(kind: &NotFoundKind) -> ErrorCode {
    match kind {
        NotFoundKind::Game => ErrorCode::GameNotFound,
        NotFoundKind::Player => ErrorCode::PlayerNotFound,
        NotFoundKind::Round => ErrorCode::RoundNotFound,
        NotFoundKind::Pick => ErrorCode::PickNotFound,
        NotFoundKind::Deck => ErrorCode::DeckNotFound,
        _ => ErrorCode::NotFound,
    }
}

fn conflict_code(kind: &ConflictKind) -> ErrorCode {
    match kind {
        ConflictKind::RoundInProgress => ErrorCode::RoundInProgress,
        ConflictKind::CardAlreadyHeld => ErrorCode::CardAlreadyHeld,
        ConflictKind::CardAlreadyPlayed => ErrorCode::CardAlreadyPlayed,
        ConflictKind::PromptAlreadyUsed => ErrorCode::PromptAlreadyUsed,
        ConflictKind::DuplicateRound => ErrorCode::DuplicateRound,
        ConflictKind::DuplicateSubmission => ErrorCode::DuplicateSubmission,
        ConflictKind::DuplicatePlayer => ErrorCode::DuplicatePlayer,
        ConflictKind::SerializationFailure => ErrorCode::SerializationFailure,
        _ => ErrorCode::Conflict,
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(kind, detail) => AppError::BadRequest {
                code: validation_code(&kind),
                detail,
            },
            DomainError::NotFound(kind, detail) => AppError::NotFound {
                code: not_found_code(&kind),
                detail,
            },
            DomainError::Conflict(kind, detail) => AppError::Conflict {
                code: conflict_code(&kind),
                detail,
            },
            DomainError::PoolExhausted(kind, detail) => AppError::PoolExhausted {
                code: match kind {
                    PoolKind::AnswerCards => ErrorCode::AnswerPoolExhausted,
                    PoolKind::PromptCards => ErrorCode::PromptPoolExhausted,
                },
                detail,
            },
            DomainError::Invariant(detail) => {
                error!(detail = %detail, "invariant violation");
                AppError::Internal {
                    code: ErrorCode::InvariantViolation,
                    detail,
                }
            }
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::DbUnavailable => AppError::DbUnavailable,
                InfraErrorKind::Timeout => AppError::Timeout { detail },
                InfraErrorKind::DataCorruption => AppError::Internal {
                    code: ErrorCode::DataCorruption,
                    detail,
                },
                _ => AppError::Internal {
                    code: ErrorCode::Internal,
                    detail,
                },
            },
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::from(map_db_err(e))
    }
}

impl From<db_infra::DbInfraError> for AppError {
    fn from(e: db_infra::DbInfraError) -> Self {
        match e {
            db_infra::DbInfraError::Config { message } => AppError::config(message),
            db_infra::DbInfraError::Connect { message } => {
                error!(detail = %message, "database connect failed");
                AppError::DbUnavailable
            }
            db_infra::DbInfraError::Migration { message } => AppError::internal(message),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().as_str();

        let problem_details = ProblemDetails {
            type_: format!("https://cah-engine.dev/errors/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.to_string(),
        };

        let mut builder = HttpResponse::build(status);
        builder.content_type("application/problem+json");
        if status == StatusCode::SERVICE_UNAVAILABLE {
            builder.insert_header(("Retry-After", "1"));
        }
        builder.json(problem_details)
    }
}

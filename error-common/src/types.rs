use crate::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error categories from the engine's error handling design (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    RateLimited,
    Transient,
    Fatal,
}

impl ErrorKind {
    /// Whether a worker boundary should retry an operation that failed with
    /// this kind rather than surface it immediately.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Transient)
    }
}

/// The engine-wide error envelope. Domain crates convert their own
/// `thiserror` enums into this type at their public boundary so callers one
/// layer up (workers, the HTTP server) can reason about errors uniformly
/// without matching on every crate's private error type.
#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
#[error("[{code}] {message}")]
pub struct EngineError {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub message: String,
    pub error_id: Uuid,
}

impl EngineError {
    pub fn new(kind: ErrorKind, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            error_id: Uuid::new_v4(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, ErrorCode::InvalidInput, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, ErrorCode::Conflict, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, ErrorCode::TransientInfra, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => {
                Self::new(ErrorKind::NotFound, ErrorCode::NotFound, "record not found")
            }
            other => Self::new(
                ErrorKind::Transient,
                ErrorCode::TransientInfra,
                format!("database error: {other}"),
            ),
        }
    }
}

impl From<redis::RedisError> for EngineError {
    fn from(err: redis::RedisError) -> Self {
        Self::new(
            ErrorKind::Transient,
            ErrorCode::TransientInfra,
            format!("kv store error: {err}"),
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

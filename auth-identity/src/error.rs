use thiserror::Error;

use error_common::{EngineError, ErrorCode, ErrorKind};

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account disabled")]
    AccountDisabled,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token")]
    InvalidToken,

    #[error("token kind mismatch: expected {expected}, got {actual}")]
    TokenKindMismatch { expected: &'static str, actual: String },

    #[error("super-admin privileges required for tenant context override")]
    SuperAdminRequired,

    #[error("tenant context override denied")]
    TenantContextDenied,

    #[error("unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("password hashing error: {0}")]
    Hashing(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("database error: {0}")]
    Database(#[from] database_layer::DatabaseError),

    #[error("kv store error: {0}")]
    Kv(#[from] redis::RedisError),
}

pub type Result<T> = std::result::Result<T, IdentityError>;

impl From<IdentityError> for EngineError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials => {
                EngineError::new(ErrorKind::Authentication, ErrorCode::InvalidCredentials, "invalid credentials")
            }
            IdentityError::AccountDisabled => {
                EngineError::new(ErrorKind::Authentication, ErrorCode::AccountDisabled, "account disabled")
            }
            IdentityError::TokenExpired => {
                EngineError::new(ErrorKind::Authentication, ErrorCode::TokenExpired, "token expired")
            }
            IdentityError::InvalidToken | IdentityError::TokenKindMismatch { .. } => {
                EngineError::new(ErrorKind::Authentication, ErrorCode::InvalidToken, "invalid token")
            }
            IdentityError::SuperAdminRequired => EngineError::new(
                ErrorKind::Authorization,
                ErrorCode::SuperAdminRequired,
                "super-admin privileges required",
            ),
            IdentityError::TenantContextDenied => EngineError::new(
                ErrorKind::Authorization,
                ErrorCode::TenantContextDenied,
                "tenant context override denied",
            ),
            IdentityError::UnknownTenant(t) => {
                EngineError::new(ErrorKind::Validation, ErrorCode::InvalidInput, format!("unknown tenant: {t}"))
            }
            IdentityError::RateLimited { retry_after_secs } => EngineError::new(
                ErrorKind::RateLimited,
                ErrorCode::RateLimited,
                format!("rate limited, retry after {retry_after_secs}s"),
            ),
            IdentityError::Hashing(msg) | IdentityError::Signing(msg) => {
                EngineError::new(ErrorKind::Fatal, ErrorCode::Internal, msg)
            }
            IdentityError::Database(e) => e.into(),
            IdentityError::Kv(e) => e.into(),
        }
    }
}

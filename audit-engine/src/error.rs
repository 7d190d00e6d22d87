use error_common::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("audit entry validation failed: {0}")]
    Validation(String),

    #[error("audit storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;

impl From<AuditError> for EngineError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::Validation(msg) => EngineError::validation(msg),
            AuditError::Storage(e) => e.into(),
        }
    }
}

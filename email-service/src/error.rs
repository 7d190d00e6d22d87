use thiserror::Error;
use error_common::{EngineError, ErrorKind};

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("smtp delivery failed: {0}")]
    Smtp(String),

    #[error("template render failed: {0}")]
    Template(String),

    #[error("malformed notification payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

pub type EmailResult<T> = std::result::Result<T, EmailError>;

impl From<EmailError> for EngineError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::Smtp(_) => EngineError::transient(err.to_string()),
            EmailError::Template(_) | EmailError::MalformedPayload(_) => {
                EngineError::new(ErrorKind::Fatal, error_common::ErrorCode::Internal, err.to_string())
            }
        }
    }
}

use thiserror::Error;
use error_common::{EngineError, ErrorKind};

#[derive(Error, Debug)]
pub enum SmsError {
    #[error("invalid E.164 phone number: {0}")]
    InvalidRecipient(String),

    #[error("sms gateway request failed: {0}")]
    Gateway(String),

    #[error("malformed notification payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

pub type SmsResult<T> = std::result::Result<T, SmsError>;

impl From<SmsError> for EngineError {
    fn from(err: SmsError) -> Self {
        match err {
            SmsError::InvalidRecipient(_) => EngineError::validation(err.to_string()),
            SmsError::Gateway(_) => EngineError::transient(err.to_string()),
            SmsError::MalformedPayload(_) => {
                EngineError::new(ErrorKind::Fatal, error_common::ErrorCode::Internal, err.to_string())
            }
        }
    }
}

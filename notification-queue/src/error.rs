use thiserror::Error;
use error_common::{EngineError, ErrorKind};

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("kv store error: {0}")]
    Kv(#[from] redis::RedisError),

    #[error("failed to serialize queue item: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("channel delivery failed: {0}")]
    ChannelSend(String),

    #[error("item {0} missing from item store (dequeued id with no payload)")]
    MissingItem(String),
}

pub type Result<T> = std::result::Result<T, QueueError>;

impl From<QueueError> for EngineError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Kv(e) => e.into(),
            QueueError::Serialize(_) | QueueError::MissingItem(_) => {
                EngineError::new(ErrorKind::Fatal, error_common::ErrorCode::Internal, err.to_string())
            }
            QueueError::ChannelSend(msg) => EngineError::transient(msg),
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("malformed stream entry: {0}")]
    MalformedEntry(String),
}

pub type Result<T> = std::result::Result<T, EventBusError>;

impl From<EventBusError> for error_common::EngineError {
    fn from(err: EventBusError) -> Self {
        error_common::EngineError::transient(err.to_string())
    }
}

use error_common::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("failed to (de)serialize health state: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HealthError>;

impl From<HealthError> for EngineError {
    fn from(err: HealthError) -> Self {
        match err {
            HealthError::Redis(e) => e.into(),
            HealthError::Serialize(e) => EngineError::new(
                error_common::ErrorKind::Fatal,
                error_common::ErrorCode::Internal,
                e.to_string(),
            ),
        }
    }
}

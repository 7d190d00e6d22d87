use thiserror::Error;

use database_layer::DatabaseError;
use error_common::EngineError;

#[derive(Error, Debug)]
pub enum ShiftRoutingError {
    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("failed to (de)serialize shift cache entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

pub type Result<T> = std::result::Result<T, ShiftRoutingError>;

impl From<ShiftRoutingError> for EngineError {
    fn from(err: ShiftRoutingError) -> Self {
        match err {
            ShiftRoutingError::Cache(e) => e.into(),
            ShiftRoutingError::Serialize(_) => {
                EngineError::new(error_common::ErrorKind::Fatal, error_common::ErrorCode::Internal, err.to_string())
            }
            ShiftRoutingError::Database(e) => e.into(),
        }
    }
}

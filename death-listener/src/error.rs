use database_layer::DatabaseError;
use error_common::EngineError;
use events_bus::EventBusError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("kv store error: {0}")]
    Kv(#[from] redis::RedisError),
}

pub type Result<T> = std::result::Result<T, ListenerError>;

impl From<ListenerError> for EngineError {
    fn from(err: ListenerError) -> Self {
        match err {
            ListenerError::Database(e) => e.into(),
            ListenerError::EventBus(e) => e.into(),
            ListenerError::Kv(e) => e.into(),
        }
    }
}

impl ListenerError {
    /// Whether a poll-tick error is worth retrying on the next tick rather
    /// than propagating out of the loop (§4.1: "transient store errors are
    /// retried on the next poll tick").
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ListenerError::Database(DatabaseError::Sqlx(_)) | ListenerError::EventBus(_) | ListenerError::Kv(_)
        )
    }
}

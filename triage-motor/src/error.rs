use database_layer::DatabaseError;
use error_common::EngineError;
use events_bus::EventBusError;
use notification_queue::QueueError;
use shift_routing::ShiftRoutingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("shift routing error: {0}")]
    ShiftRouting(#[from] ShiftRoutingError),

    #[error("notification queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("audit sink error: {0}")]
    Audit(#[from] audit_engine::AuditError),

    #[error("received a status transition that is not valid from the current status")]
    InvalidTransition,
}

pub type Result<T> = std::result::Result<T, TriageError>;

impl From<TriageError> for EngineError {
    fn from(err: TriageError) -> Self {
        match err {
            TriageError::Database(e) => e.into(),
            TriageError::EventBus(e) => e.into(),
            TriageError::ShiftRouting(e) => e.into(),
            TriageError::Queue(e) => e.into(),
            TriageError::Audit(e) => e.into(),
            TriageError::InvalidTransition => EngineError::conflict(err.to_string()),
        }
    }
}

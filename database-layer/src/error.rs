use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("record not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

impl From<DatabaseError> for error_common::EngineError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound => error_common::EngineError::not_found("record not found"),
            DatabaseError::Conflict(msg) => error_common::EngineError::conflict(msg),
            DatabaseError::Sqlx(e) => e.into(),
        }
    }
}

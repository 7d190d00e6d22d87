use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("configuration source error: {0}")]
    Source(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

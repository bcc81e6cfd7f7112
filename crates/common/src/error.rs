use thiserror::Error;

#[derive(Debug, Error)]
pub enum HerdbookError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type HerdbookResult<T> = Result<T, HerdbookError>;

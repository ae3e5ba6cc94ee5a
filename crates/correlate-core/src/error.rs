use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorrelateError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, CorrelateError>;

//! Errors surfaced by correlated invocations.

use correlate_core::CorrelateError;
use thiserror::Error;

/// Outcome of a failed correlated invocation, generic over the task's error.
#[derive(Debug, Error)]
pub enum CorrelationError<E> {
    /// Rejected before any context was created or the task was invoked.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Options or collaborators could not be set up.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The wrapped task failed and the failure was not handled.
    #[error("{0}")]
    Task(E),

    /// The exception hook failed; replaces the task's error.
    #[error("{0}")]
    Handler(E),
}

impl<E> CorrelationError<E> {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// The wrapped task's own error, if it was not handled.
    pub fn task_error(&self) -> Option<&E> {
        match self {
            Self::Task(error) => Some(error),
            _ => None,
        }
    }

    /// The task or hook error, if this is not an argument error.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Task(error) | Self::Handler(error) => Some(error),
            Self::InvalidArgument(_) | Self::Configuration(_) => None,
        }
    }
}

impl<E> From<CorrelateError> for CorrelationError<E> {
    fn from(error: CorrelateError) -> Self {
        match error {
            CorrelateError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            CorrelateError::Configuration(msg) => Self::Configuration(msg),
        }
    }
}

//! Exception hook types.

use correlate_core::{CorrelationContext, CorrelationId};

/// Decision returned by an exception hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// Swallow the error; the invocation completes with `T::default()`.
    Handled,

    /// Surface the original error to the caller.
    Propagate,
}

impl From<bool> for ErrorDisposition {
    fn from(handled: bool) -> Self {
        if handled {
            Self::Handled
        } else {
            Self::Propagate
        }
    }
}

/// What an exception hook gets to see.
///
/// The context is already marked failed and is still the ambient one.
#[derive(Debug)]
pub struct ExceptionContext<'a, E> {
    correlation_context: &'a CorrelationContext,
    error: &'a E,
}

impl<'a, E> ExceptionContext<'a, E> {
    pub(crate) fn new(correlation_context: &'a CorrelationContext, error: &'a E) -> Self {
        Self {
            correlation_context,
            error,
        }
    }

    pub fn correlation_context(&self) -> &CorrelationContext {
        self.correlation_context
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        self.correlation_context.id()
    }

    pub fn error(&self) -> &E {
        self.error
    }
}

//! The per-invocation correlation context.

use crate::error::{CorrelateError, Result};
use crate::ids::CorrelationId;
use std::sync::atomic::{AtomicBool, Ordering};

/// Context created for one correlated invocation.
///
/// The id never changes after construction. The failure flag is flipped at
/// most once, by the manager that owns the context, when the wrapped work
/// fails or is abandoned.
#[derive(Debug)]
pub struct CorrelationContext {
    id: CorrelationId,
    has_error: AtomicBool,
}

impl CorrelationContext {
    /// Create a context for an already-resolved id.
    ///
    /// Blank ids are rejected; construction never generates one.
    pub fn new(id: CorrelationId) -> Result<Self> {
        if id.is_blank() {
            return Err(CorrelateError::InvalidArgument(
                "correlation context requires a non-empty id".to_string(),
            ));
        }
        Ok(Self {
            id,
            has_error: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> &CorrelationId {
        &self.id
    }

    /// Whether the correlated work ended in failure.
    pub fn has_error(&self) -> bool {
        self.has_error.load(Ordering::Acquire)
    }

    /// Record failure. Returns `true` only for the call that set the flag.
    pub fn mark_failed(&self) -> bool {
        !self.has_error.swap(true, Ordering::AcqRel)
    }
}

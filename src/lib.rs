//! Correlation context propagation for async call chains.
//!
//! [`CorrelationManager`] wraps a unit of work in its own correlation
//! context, makes that context ambient for everything the work awaits, and
//! tears it down before the caller sees the outcome. Logging and tracing
//! code reads the current id through [`ambient::current_correlation_id`].

pub mod error;
pub mod exception;
pub mod manager;
pub mod options;

pub use correlate_core::ambient;
pub use correlate_core::generator;
pub use correlate_core::{
    CorrelateError, CorrelationContext, CorrelationId, CorrelationIdProvider,
    SequentialCorrelationIdProvider, UuidCorrelationIdProvider, generate_correlation_id,
};
pub use correlate_observability::{spans, tracing_setup};

pub use error::CorrelationError;
pub use exception::{ErrorDisposition, ExceptionContext};
pub use manager::{CorrelationManager, CorrelationManagerBuilder};
pub use options::CorrelateOptions;

//! Correlation core types and the ambient context slot.

pub mod ambient;
pub mod context;
pub mod error;
pub mod generator;
pub mod ids;

pub use context::CorrelationContext;
pub use error::{CorrelateError, Result};
pub use generator::{
    CorrelationIdProvider, SequentialCorrelationIdProvider, UuidCorrelationIdProvider,
    generate_correlation_id,
};
pub use ids::CorrelationId;

//! Span helpers for correlated work.
//!
//! All span names use the `correlate.` prefix for low cardinality.

use correlate_core::CorrelationId;
use correlate_core::ambient::current_correlation_id;
use tracing::Span;

/// Outcome values recorded on [`correlation_activity`] spans.
pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_HANDLED: &str = "handled";
pub const OUTCOME_FAILED: &str = "failed";
pub const OUTCOME_CANCELLED: &str = "cancelled";

/// Logging scope for a correlated invocation.
///
/// Every event emitted while this span is entered carries `correlation_id`.
#[inline]
pub fn correlation_scope(correlation_id: &CorrelationId) -> Span {
    tracing::info_span!(
        "correlate.scope",
        correlation_id = %correlation_id,
    )
}

/// Activity span for a correlated invocation.
///
/// Parent: correlation_scope, when logging is enabled.
/// `outcome` is recorded by the manager once the work settles.
#[inline]
pub fn correlation_activity(correlation_id: &CorrelationId) -> Span {
    tracing::debug_span!(
        "correlate.activity",
        correlation_id = %correlation_id,
        outcome = tracing::field::Empty,
    )
}

/// Record how the activity ended.
pub fn record_outcome(span: &Span, outcome: &'static str) {
    span.record("outcome", outcome);
}

/// Span for a named unit of work inside whatever flow is current.
///
/// Stamps the ambient correlation id, or `none` outside a correlated flow.
#[inline]
pub fn operation(name: &str) -> Span {
    let correlation_id = current_correlation_id()
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|| "none".to_string());
    tracing::info_span!(
        "correlate.operation",
        operation = name,
        correlation_id = correlation_id,
    )
}

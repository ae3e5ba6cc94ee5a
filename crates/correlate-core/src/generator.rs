//! Correlation id providers.
//!
//! A provider is only consulted when the caller did not supply an id.

use crate::ids::CorrelationId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Produces a fresh correlation id on every call.
pub trait CorrelationIdProvider: Send + Sync {
    fn generate(&self) -> CorrelationId;
}

/// Random v4 UUIDs rendered as 32 lowercase hex digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCorrelationIdProvider;

impl CorrelationIdProvider for UuidCorrelationIdProvider {
    fn generate(&self) -> CorrelationId {
        CorrelationId::new(Uuid::new_v4().simple().to_string())
    }
}

static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// `corr-<unix millis>-<counter>` ids, ordered within a process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialCorrelationIdProvider;

impl CorrelationIdProvider for SequentialCorrelationIdProvider {
    fn generate(&self) -> CorrelationId {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let counter = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed);
        CorrelationId::new(format!("corr-{}-{}", millis, counter))
    }
}

pub fn generate_correlation_id() -> CorrelationId {
    UuidCorrelationIdProvider.generate()
}

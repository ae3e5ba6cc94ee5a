//! Ambient correlation context for async flows.
//!
//! The current context lives in a tokio task-local. The value is swapped in
//! around every poll of the scoped future and swapped out again afterwards,
//! so it follows the future across `.await` points and worker threads and is
//! never visible to unrelated tasks. Nested scopes shadow the outer value
//! until they finish.

use crate::context::CorrelationContext;
use crate::ids::CorrelationId;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::task::futures::TaskLocalFuture;

tokio::task_local! {
    static CURRENT_CONTEXT: Arc<CorrelationContext>;
}

/// Future returned by [`scoped`].
pub type Scoped<F> = TaskLocalFuture<Arc<CorrelationContext>, F>;

/// The context active in the current flow, if any.
pub fn current() -> Option<Arc<CorrelationContext>> {
    CURRENT_CONTEXT.try_with(Arc::clone).ok()
}

/// Id of the context active in the current flow, if any.
pub fn current_correlation_id() -> Option<CorrelationId> {
    CURRENT_CONTEXT.try_with(|context| context.id().clone()).ok()
}

/// Install `context` as current while `future` runs.
///
/// The previous value is restored whenever `future` yields, when it
/// completes, and when the returned future is dropped before completion.
pub fn scoped<F>(context: Arc<CorrelationContext>, future: F) -> Scoped<F>
where
    F: Future,
{
    CURRENT_CONTEXT.scope(context, future)
}

/// Synchronous counterpart of [`scoped`].
pub fn sync_scoped<F, R>(context: Arc<CorrelationContext>, f: F) -> R
where
    F: FnOnce() -> R,
{
    CURRENT_CONTEXT.sync_scope(context, f)
}

/// Carry the caller's current context into `future`.
///
/// The context is captured when this function is called, not when the
/// returned future is first polled.
pub fn inherit<F>(future: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    let context = current();
    async move {
        match context {
            Some(context) => CURRENT_CONTEXT.scope(context, future).await,
            None => future.await,
        }
    }
}

/// `tokio::spawn` that keeps the spawning flow's context.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(inherit(future))
}

//! Correlation manager
//!
//! Runs a unit of work inside its own correlation context. The context is
//! installed as the ambient one before the work starts and removed before
//! the caller sees the outcome. Failures are recorded on the context and
//! offered to an optional exception hook while the context is still
//! ambient, so anything the hook logs is correlated too.

use crate::error::CorrelationError;
use crate::exception::{ErrorDisposition, ExceptionContext};
use crate::options::CorrelateOptions;
use correlate_core::ambient;
use correlate_core::{
    CorrelationContext, CorrelationId, CorrelationIdProvider, UuidCorrelationIdProvider,
};
use correlate_observability::spans;
use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, Span, debug, error, info, warn};

/// Hook shape used internally: `Some(value)` means the error was handled.
type RecoverFn<T, E> = fn(&ExceptionContext<'_, E>) -> Result<Option<T>, E>;

/// Orchestrates correlated invocations.
///
/// Cheap to clone; clones share the id provider.
#[derive(Clone)]
pub struct CorrelationManager {
    options: CorrelateOptions,
    id_provider: Arc<dyn CorrelationIdProvider>,
}

impl CorrelationManager {
    pub fn new(options: CorrelateOptions) -> Self {
        Self {
            options,
            id_provider: Arc::new(UuidCorrelationIdProvider),
        }
    }

    pub fn builder() -> CorrelationManagerBuilder {
        CorrelationManagerBuilder::default()
    }

    pub fn options(&self) -> &CorrelateOptions {
        &self.options
    }

    /// Run `task` under a freshly generated correlation id.
    pub async fn correlate<F, Fut, T, E>(&self, task: F) -> Result<T, CorrelationError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute(None, task, None::<RecoverFn<T, E>>).await
    }

    /// Run `task` under a generated id, offering failures to `on_error`.
    pub async fn correlate_with_handler<F, Fut, T, E, H>(
        &self,
        task: F,
        on_error: H,
    ) -> Result<T, CorrelationError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Default,
        H: FnOnce(&ExceptionContext<'_, E>) -> Result<ErrorDisposition, E>,
    {
        self.correlate_with(None, task, on_error).await
    }

    /// Run `task` under `correlation_id`, or a generated id when `None`.
    ///
    /// An empty or blank id is rejected; it does not fall back to generation.
    pub async fn correlate_with_id<F, Fut, T, E>(
        &self,
        correlation_id: Option<&str>,
        task: F,
    ) -> Result<T, CorrelationError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute(correlation_id, task, None::<RecoverFn<T, E>>)
            .await
    }

    /// Run `task` with an explicit (or generated) id and an exception hook.
    ///
    /// When `task` fails the context is marked failed and `on_error` runs
    /// while the context is still ambient:
    /// - `Ok(ErrorDisposition::Handled)` completes with `T::default()`
    /// - `Ok(ErrorDisposition::Propagate)` returns [`CorrelationError::Task`]
    /// - `Err(e)` returns [`CorrelationError::Handler`] with the hook's error
    ///
    /// The hook fails with the task's error type `E`; a hook whose own
    /// failures have another type converts them with `?` through `From`.
    ///
    /// The ambient context is released before this returns in every case.
    pub async fn correlate_with<F, Fut, T, E, H>(
        &self,
        correlation_id: Option<&str>,
        task: F,
        on_error: H,
    ) -> Result<T, CorrelationError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Default,
        H: FnOnce(&ExceptionContext<'_, E>) -> Result<ErrorDisposition, E>,
    {
        self.execute(correlation_id, task, Some(recover_with_default(on_error)))
            .await
    }

    /// Synchronous counterpart of [`CorrelationManager::correlate_with_id`].
    pub fn correlate_sync<F, T, E>(
        &self,
        correlation_id: Option<&str>,
        f: F,
    ) -> Result<T, CorrelationError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.execute_sync(correlation_id, f, None::<RecoverFn<T, E>>)
    }

    /// Synchronous counterpart of [`CorrelationManager::correlate_with`].
    pub fn correlate_sync_with<F, T, E, H>(
        &self,
        correlation_id: Option<&str>,
        f: F,
        on_error: H,
    ) -> Result<T, CorrelationError<E>>
    where
        F: FnOnce() -> Result<T, E>,
        T: Default,
        H: FnOnce(&ExceptionContext<'_, E>) -> Result<ErrorDisposition, E>,
    {
        self.execute_sync(correlation_id, f, Some(recover_with_default(on_error)))
    }

    async fn execute<F, Fut, T, E, H>(
        &self,
        correlation_id: Option<&str>,
        task: F,
        recover: Option<H>,
    ) -> Result<T, CorrelationError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        H: FnOnce(&ExceptionContext<'_, E>) -> Result<Option<T>, E>,
    {
        if !self.options.is_enabled() {
            return task().await.map_err(CorrelationError::Task);
        }

        let context = Arc::new(self.create_context(correlation_id)?);
        let scope = self.logging_scope(&context);
        let flow = run_correlated(
            Arc::clone(&context),
            self.options.tracing_enabled,
            task,
            recover,
        );

        ambient::scoped(context, flow).instrument(scope).await
    }

    fn execute_sync<F, T, E, H>(
        &self,
        correlation_id: Option<&str>,
        f: F,
        recover: Option<H>,
    ) -> Result<T, CorrelationError<E>>
    where
        F: FnOnce() -> Result<T, E>,
        H: FnOnce(&ExceptionContext<'_, E>) -> Result<Option<T>, E>,
    {
        if !self.options.is_enabled() {
            return f().map_err(CorrelationError::Task);
        }

        let context = Arc::new(self.create_context(correlation_id)?);
        let scope = self.logging_scope(&context);
        let tracing_enabled = self.options.tracing_enabled;

        scope.in_scope(|| {
            ambient::sync_scoped(Arc::clone(&context), || {
                let mut completion = Completion::start(Arc::clone(&context), tracing_enabled);
                let outcome = completion.activity.in_scope(f);
                settle(&mut completion, outcome, recover)
            })
        })
    }

    fn create_context(
        &self,
        correlation_id: Option<&str>,
    ) -> correlate_core::Result<CorrelationContext> {
        let id = match correlation_id {
            Some(id) => CorrelationId::parse(id)?,
            None => self.id_provider.generate(),
        };
        CorrelationContext::new(id)
    }

    fn logging_scope(&self, context: &CorrelationContext) -> Span {
        if self.options.logging_enabled {
            spans::correlation_scope(context.id())
        } else {
            Span::none()
        }
    }
}

impl Default for CorrelationManager {
    fn default() -> Self {
        Self::new(CorrelateOptions::default())
    }
}

impl std::fmt::Debug for CorrelationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrelationManager")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CorrelationManager`].
#[derive(Default)]
pub struct CorrelationManagerBuilder {
    options: CorrelateOptions,
    id_provider: Option<Arc<dyn CorrelationIdProvider>>,
}

impl CorrelationManagerBuilder {
    pub fn with_options(mut self, options: CorrelateOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the provider consulted when no id is supplied.
    pub fn with_id_provider(mut self, provider: Arc<dyn CorrelationIdProvider>) -> Self {
        self.id_provider = Some(provider);
        self
    }

    pub fn build(self) -> CorrelationManager {
        CorrelationManager {
            options: self.options,
            id_provider: self
                .id_provider
                .unwrap_or_else(|| Arc::new(UuidCorrelationIdProvider)),
        }
    }
}

fn recover_with_default<T, E, H>(
    on_error: H,
) -> impl FnOnce(&ExceptionContext<'_, E>) -> Result<Option<T>, E>
where
    T: Default,
    H: FnOnce(&ExceptionContext<'_, E>) -> Result<ErrorDisposition, E>,
{
    move |exception: &ExceptionContext<'_, E>| {
        on_error(exception).map(|disposition| match disposition {
            ErrorDisposition::Handled => Some(T::default()),
            ErrorDisposition::Propagate => None,
        })
    }
}

async fn run_correlated<F, Fut, T, E, H>(
    context: Arc<CorrelationContext>,
    tracing_enabled: bool,
    task: F,
    recover: Option<H>,
) -> Result<T, CorrelationError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    H: FnOnce(&ExceptionContext<'_, E>) -> Result<Option<T>, E>,
{
    let mut completion = Completion::start(context, tracing_enabled);
    let outcome = task().instrument(completion.activity.clone()).await;
    settle(&mut completion, outcome, recover)
}

/// Mark failure, run the hook, and decide what the caller sees.
fn settle<T, E, H>(
    completion: &mut Completion,
    outcome: Result<T, E>,
    recover: Option<H>,
) -> Result<T, CorrelationError<E>>
where
    H: FnOnce(&ExceptionContext<'_, E>) -> Result<Option<T>, E>,
{
    let error = match outcome {
        Ok(value) => {
            completion.finish(spans::OUTCOME_SUCCESS);
            return Ok(value);
        }
        Err(error) => error,
    };

    completion.context.mark_failed();
    let verdict =
        recover.map(|recover| recover(&ExceptionContext::new(&completion.context, &error)));

    match verdict {
        Some(Ok(Some(value))) => {
            info!(
                correlation_id = %completion.context.id(),
                "Correlated task error handled by exception hook"
            );
            completion.finish(spans::OUTCOME_HANDLED);
            Ok(value)
        }
        Some(Err(handler_error)) => {
            error!(
                correlation_id = %completion.context.id(),
                "Exception hook failed"
            );
            completion.finish(spans::OUTCOME_FAILED);
            Err(CorrelationError::Handler(handler_error))
        }
        Some(Ok(None)) | None => {
            warn!(
                correlation_id = %completion.context.id(),
                "Correlated task failed"
            );
            completion.finish(spans::OUTCOME_FAILED);
            Err(CorrelationError::Task(error))
        }
    }
}

/// Tracks whether a correlated invocation settled.
///
/// Dropped unsettled means the invocation was cancelled: the context is
/// marked failed before the ambient scope unwinds. Dropped while unwinding
/// means the task or hook panicked on this stack, which is logged as a
/// failure rather than a cancellation.
struct Completion {
    context: Arc<CorrelationContext>,
    activity: Span,
    tracing_enabled: bool,
    settled: bool,
}

impl Completion {
    fn start(context: Arc<CorrelationContext>, tracing_enabled: bool) -> Self {
        let activity = if tracing_enabled {
            let activity = spans::correlation_activity(context.id());
            debug!(parent: &activity, correlation_id = %context.id(), "correlate.start");
            activity
        } else {
            Span::none()
        };
        Self {
            context,
            activity,
            tracing_enabled,
            settled: false,
        }
    }

    fn finish(&mut self, outcome: &'static str) {
        self.settled = true;
        if self.tracing_enabled {
            spans::record_outcome(&self.activity, outcome);
            debug!(
                parent: &self.activity,
                correlation_id = %self.context.id(),
                outcome,
                "correlate.stop"
            );
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.context.mark_failed();
        if std::thread::panicking() {
            if self.tracing_enabled {
                spans::record_outcome(&self.activity, spans::OUTCOME_FAILED);
            }
            error!(
                correlation_id = %self.context.id(),
                outcome = spans::OUTCOME_FAILED,
                "Correlated task panicked"
            );
            return;
        }
        if self.tracing_enabled {
            spans::record_outcome(&self.activity, spans::OUTCOME_CANCELLED);
        }
        warn!(
            correlation_id = %self.context.id(),
            outcome = spans::OUTCOME_CANCELLED,
            "Correlated task dropped before completion"
        );
    }
}

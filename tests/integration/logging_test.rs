//! Log correlation through the tracing scope

#[path = "../common.rs"]
mod common;

use common::{TestError, manager};
use correlate::{
    CorrelateOptions, CorrelationManager, ErrorDisposition, ExceptionContext, spans,
};
use std::time::Duration;
use tracing::{Instrument, info};
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_events_inside_task_carry_correlation_id() {
    let manager = manager();

    manager
        .correlate_with_id(Some("log-1"), || async {
            tokio::task::yield_now().await;
            info!("handling request");
            Ok::<_, TestError>(())
        })
        .await
        .expect("correlate");

    assert!(logs_contain("correlation_id=log-1"));
    assert!(logs_contain("handling request"));
}

#[tokio::test]
#[traced_test]
async fn test_logging_disabled_omits_scope() {
    let manager = CorrelationManager::new(CorrelateOptions::disabled().with_tracing(true));

    manager
        .correlate_with_id(Some("quiet-1"), || async {
            info!("no logging scope here");
            Ok::<_, TestError>(())
        })
        .await
        .expect("correlate");

    assert!(logs_contain("no logging scope here"));
    assert!(!logs_contain("correlate.scope{correlation_id=quiet-1}"));
}

#[tokio::test]
#[traced_test]
async fn test_activity_span_reports_start_and_stop() {
    let manager = manager();

    manager
        .correlate_with_id(Some("activity-1"), || async { Ok::<_, TestError>(()) })
        .await
        .expect("correlate");

    assert!(logs_contain("correlate.start"));
    assert!(logs_contain("correlate.stop"));
    assert!(logs_contain("outcome=\"success\""));
}

#[tokio::test]
#[traced_test]
async fn test_unhandled_failure_is_logged() {
    let manager = manager();

    let result = manager
        .correlate_with_id(Some("fail-1"), || async {
            Err::<(), _>(TestError::Task("boom".to_string()))
        })
        .await;

    assert!(result.is_err());
    assert!(logs_contain("Correlated task failed"));
    assert!(logs_contain("outcome=\"failed\""));
}

#[tokio::test]
#[traced_test]
async fn test_hook_logs_are_correlated() {
    let manager = manager();

    manager
        .correlate_with(
            Some("hook-log"),
            || async { Err::<(), _>(TestError::Task("boom".to_string())) },
            |exception: &ExceptionContext<'_, TestError>| {
                info!(error = %exception.error(), "hook saw failure");
                Ok(ErrorDisposition::Handled)
            },
        )
        .await
        .expect("handled");

    assert!(logs_contain("hook saw failure"));
    assert!(logs_contain("handled by exception hook"));
    assert!(logs_contain("outcome=\"handled\""));
}

#[tokio::test]
#[traced_test]
async fn test_operation_span_inside_correlated_task() {
    let manager = manager();

    manager
        .correlate_with_id(Some("op-1"), || async {
            async { info!("loading profile") }
                .instrument(spans::operation("load_profile"))
                .await;
            Ok::<_, TestError>(())
        })
        .await
        .expect("correlate");

    assert!(logs_contain("operation=\"load_profile\""));
    assert!(logs_contain("correlation_id=\"op-1\""));
}

#[tokio::test]
#[traced_test]
async fn test_failing_hook_is_logged_as_error() {
    let manager = manager();

    let result = manager
        .correlate_with(
            Some("hook-fail"),
            || async { Err::<(), _>(TestError::Task("boom".to_string())) },
            |_exception: &ExceptionContext<'_, TestError>| {
                Err(TestError::Hook("hook broke".to_string()))
            },
        )
        .await;

    assert!(result.is_err());
    assert!(logs_contain("Exception hook failed"));
    assert!(logs_contain("correlation_id=hook-fail"));
    assert!(!logs_contain("handled by exception hook"));
}

#[tokio::test]
#[traced_test]
async fn test_cancellation_is_logged() {
    let manager = manager();

    let outcome = tokio::time::timeout(
        Duration::from_millis(10),
        manager.correlate_with_id(Some("cancel-log"), || {
            std::future::pending::<Result<(), TestError>>()
        }),
    )
    .await;

    assert!(outcome.is_err());
    assert!(logs_contain("Correlated task dropped before completion"));
    assert!(logs_contain("outcome=\"cancelled\""));
}

#[test]
#[traced_test]
fn test_panicking_task_is_not_reported_as_cancelled() {
    let manager = manager();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        manager.correlate_sync(Some("panic-log"), || -> Result<(), TestError> {
            panic!("task blew up")
        })
    }));

    assert!(outcome.is_err());
    assert!(logs_contain("Correlated task panicked"));
    assert!(!logs_contain("dropped before completion"));
    assert!(!logs_contain("outcome=\"cancelled\""));
}

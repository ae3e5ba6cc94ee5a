//! Standard tracing subscriber setup for binaries.

/// Initialize a tracing subscriber with env-based filtering.
///
/// Default directives:
/// - `correlate=info`
/// - `correlate_demo=info`
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("correlate=info".parse().unwrap_or_default())
        .add_directive("correlate_demo=info".parse().unwrap_or_default());

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

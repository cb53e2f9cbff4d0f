//! Shared test bootstrap.

/// Initialize logging once per test binary so failures carry trace output.
#[ctor::ctor]
fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

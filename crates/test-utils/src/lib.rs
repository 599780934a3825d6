//! Shared test doubles for `watchrun`.
//!
//! - [`fake_executor`]: an `ExecutorBackend` whose processes never touch the
//!   OS and whose builds exit when the test says so.
//! - [`harness`]: a supervisor running on that executor, plus the handles to
//!   drive it.

pub mod fake_executor;
pub mod harness;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for anything a test awaits.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Output is only shown for failing tests (or with `--nocapture`). The filter
/// comes from `WATCHRUN_LOG`, e.g. `WATCHRUN_LOG=watchrun=debug`, and
/// defaults to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("WATCHRUN_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, panicking after [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    with_timeout_of(TEST_TIMEOUT, f).await
}

/// Await `f`, panicking after `limit`.
pub async fn with_timeout_of<F, T>(limit: Duration, f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(limit, f).await {
        Ok(value) => value,
        Err(_) => panic!("test timed out after {limit:?}"),
    }
}

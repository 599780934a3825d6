// tests/signal_listener.rs

// Sends real signals to the test process, so it lives in its own binary.

#![cfg(unix)]

use std::error::Error;
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::{sleep, timeout};

use watchrun::signal::{shutdown_channel, spawn_signal_listener};
use watchrun_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn sigterm_requests_shutdown_exactly_once() -> TestResult {
    init_tracing();
    // Installs a handler so SIGTERM never takes its default action here.
    let mut sigterm = signal(SignalKind::terminate())?;

    let (trigger, mut shutdown) = shutdown_channel();
    let listener = spawn_signal_listener(trigger);

    // The listener registers its own handler once it is polled; repeat the
    // signal until it has been seen.
    with_timeout(async {
        loop {
            kill(Pid::this(), Signal::SIGTERM)?;
            if timeout(Duration::from_millis(50), shutdown.requested()).await.is_ok() {
                return Ok::<_, nix::Error>(());
            }
        }
    })
    .await?;

    with_timeout(listener).await?;
    assert!(shutdown.is_requested());
    with_timeout(sigterm.recv()).await.ok_or("signal stream closed")?;

    // A second request has nobody left to deliver it.
    kill(Pid::this(), Signal::SIGTERM)?;
    with_timeout(sigterm.recv()).await.ok_or("signal stream closed")?;
    sleep(Duration::from_millis(50)).await;
    assert!(shutdown.is_requested());
    with_timeout(shutdown.requested()).await;
    Ok(())
}

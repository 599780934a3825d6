// tests/supervisor_shutdown.rs

use std::error::Error;

use tokio::time::{sleep, Duration};

use watchrun::engine::{rebuild_queue, ExitOutcome, RebuildSignal, Supervisor, SupervisorState};
use watchrun::signal::shutdown_channel;
use watchrun::types::{CommandSpec, ProcessRole};
use watchrun_test_utils::fake_executor::FakeExecutor;
use watchrun_test_utils::harness::HarnessBuilder;
use watchrun_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn shutdown_kills_running_application() -> TestResult {
    init_tracing();
    let mut h = HarnessBuilder::new().spawn();

    h.start();
    h.wait_for_state(SupervisorState::Running).await;
    let app = h.ctl.spawned(ProcessRole::Application)[0];

    assert!(h.shutdown());
    h.wait_for_state(SupervisorState::ShuttingDown).await;

    let ctl = h.ctl.clone();
    h.join().await?;

    assert_eq!(ctl.killed(), vec![app]);
    assert!(ctl.reaped().contains(&app));
    assert_eq!(ctl.live(ProcessRole::Application), 0);
    assert_eq!(ctl.live(ProcessRole::Build), 0);
    Ok(())
}

#[tokio::test]
async fn shutdown_while_idle_touches_nothing() -> TestResult {
    init_tracing();
    let mut h = HarnessBuilder::new().spawn();

    h.shutdown();
    let ctl = h.ctl.clone();
    h.join().await?;

    assert!(ctl.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn shutdown_after_app_exited_on_its_own_is_clean() -> TestResult {
    init_tracing();
    let mut h = HarnessBuilder::new().spawn();

    h.start();
    h.wait_for_state(SupervisorState::Running).await;
    let app = h.ctl.spawned(ProcessRole::Application)[0];
    h.ctl.exit_process(app, ExitOutcome::Success);

    h.shutdown();
    h.join().await?;
    Ok(())
}

#[tokio::test]
async fn repeated_shutdown_requests_are_harmless() -> TestResult {
    init_tracing();
    let mut h = HarnessBuilder::new().spawn();

    h.start();
    h.wait_for_state(SupervisorState::Running).await;

    assert!(h.shutdown());
    assert!(!h.shutdown());
    assert!(!h.shutdown());

    let ctl = h.ctl.clone();
    h.join().await?;
    assert_eq!(ctl.killed().len(), 1);
    Ok(())
}

#[tokio::test]
async fn shutdown_during_build_lets_build_finish_and_skips_app() -> TestResult {
    init_tracing();
    let mut h = HarnessBuilder::new().spawn();
    h.ctl.hold_builds(true);

    h.start();
    h.wait_for_state(SupervisorState::Building).await;
    h.shutdown();

    sleep(Duration::from_millis(50)).await;
    assert!(!h.is_finished());
    assert!(h.ctl.killed().is_empty());
    assert_eq!(h.ctl.live(ProcessRole::Build), 1);

    h.ctl.release_build(ExitOutcome::Success);
    let ctl = h.ctl.clone();
    h.join().await?;

    assert!(ctl.spawned(ProcessRole::Application).is_empty());
    assert_eq!(ctl.live(ProcessRole::Build), 0);
    Ok(())
}

#[tokio::test]
async fn shutdown_wins_over_pending_rebuilds() -> TestResult {
    init_tracing();
    let mut h = HarnessBuilder::new().spawn();

    h.start();
    h.change();
    h.shutdown();

    let ctl = h.ctl.clone();
    h.join().await?;
    assert!(ctl.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn closing_the_queue_shuts_the_supervisor_down() -> TestResult {
    init_tracing();
    let (executor, ctl) = FakeExecutor::new();
    let (rebuilds, rebuild_rx) = rebuild_queue(5);
    let (_trigger, shutdown) = shutdown_channel();

    let supervisor = Supervisor::new(
        executor,
        CommandSpec::new("go", ["build"]),
        CommandSpec::new("./app", Vec::<String>::new()),
        rebuild_rx,
        shutdown,
    );
    let task = tokio::spawn(supervisor.run());

    rebuilds.offer(RebuildSignal::startup());
    drop(rebuilds);

    with_timeout(task).await??;

    // The queued signal is still processed before the loop notices the
    // queue is closed; the app it started is then stopped.
    assert_eq!(ctl.spawned(ProcessRole::Application).len(), 1);
    assert_eq!(ctl.killed().len(), 1);
    assert_eq!(ctl.live(ProcessRole::Application), 0);
    Ok(())
}

// src/engine/supervisor.rs

use std::fmt;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::errors::{Result, WatchrunError};
use crate::exec::{ExecutorBackend, ProcessHandle};
use crate::signal::ShutdownSignal;
use crate::types::{CommandSpec, ProcessRole};

use super::queue::{RebuildReceiver, RebuildSignal};
use super::{ExitOutcome, SupervisorState};

/// Drives the watch → build → run cycle.
///
/// The supervisor is the single consumer of rebuild signals and the sole
/// owner of process handles: at most one build and at most one application
/// are alive at any time. Each cycle is strictly sequential:
///
/// 1. discard signals that are already queued (they belong to the same
///    burst), then kill the running application (if any) and reap it
/// 2. spawn the build and wait for it
/// 3. on success, spawn the application and leave it running
///
/// A failed build is logged and the supervisor goes back to waiting; the old
/// application stays dead. Kill and spawn failures are fatal.
///
/// Signals arriving while a cycle is in progress stay queued and start
/// exactly one further cycle.
///
/// Shutdown requests are only observed between cycles. A build in progress
/// is never killed: it runs to completion, the application is not started,
/// and then the normal shutdown path runs.
pub struct Supervisor<E: ExecutorBackend> {
    executor: E,
    build_cmd: CommandSpec,
    run_cmd: CommandSpec,
    rebuilds: RebuildReceiver,
    shutdown: ShutdownSignal,
    app: Option<E::Handle>,
    state_tx: watch::Sender<SupervisorState>,
    cycles: u64,
}

impl<E: ExecutorBackend> fmt::Debug for Supervisor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("build_cmd", &self.build_cmd)
            .field("run_cmd", &self.run_cmd)
            .field("state", &*self.state_tx.borrow())
            .field("cycles", &self.cycles)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Supervisor<E> {
    pub fn new(
        executor: E,
        build_cmd: CommandSpec,
        run_cmd: CommandSpec,
        rebuilds: RebuildReceiver,
        shutdown: ShutdownSignal,
    ) -> Self {
        let (state_tx, _) = watch::channel(SupervisorState::Idle);
        Self {
            executor,
            build_cmd,
            run_cmd,
            rebuilds,
            shutdown,
            app: None,
            state_tx,
            cycles: 0,
        }
    }

    /// Observe state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<SupervisorState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> SupervisorState {
        *self.state_tx.borrow()
    }

    /// Main loop. Returns after an orderly shutdown, or with the first fatal
    /// error.
    pub async fn run(mut self) -> Result<()> {
        info!(build = %self.build_cmd, run = %self.run_cmd, "supervisor started");

        loop {
            debug!(state = %self.state(), "waiting for rebuild signal");

            tokio::select! {
                biased;

                _ = self.shutdown.requested() => {
                    info!("shutdown requested");
                    break;
                }

                signal = self.rebuilds.recv() => match signal {
                    Some(signal) => {
                        let coalesced = self.rebuilds.drain_pending();
                        self.rebuild(signal, coalesced).await?;
                    }
                    None => {
                        info!("rebuild queue closed; shutting down");
                        break;
                    }
                },
            }
        }

        self.shut_down().await
    }

    async fn rebuild(&mut self, signal: RebuildSignal, coalesced: usize) -> Result<()> {
        self.cycles += 1;
        let cycle = self.cycles;
        info!(cycle, reason = ?signal.reason, coalesced, "rebuild requested");

        // The cycle starts here; the old application is no longer Running.
        self.set_state(SupervisorState::Building);
        self.stop_application().await?;

        match self.build(cycle).await {
            Ok(()) => {}
            Err(err @ WatchrunError::BuildFailed { .. }) => {
                warn!(cycle, error = %err, "build failed; waiting for next change");
                self.set_state(SupervisorState::Idle);
                return Ok(());
            }
            Err(err) => return Err(err),
        }

        if self.shutdown.is_requested() {
            info!(cycle, "shutdown requested during build; not starting application");
            self.set_state(SupervisorState::Idle);
            return Ok(());
        }

        self.start_application(cycle)
    }

    /// Spawn the build and wait for it. A non-successful exit is reported as
    /// `BuildFailed`.
    async fn build(&mut self, cycle: u64) -> Result<()> {
        info!(cycle, command = %self.build_cmd, "building");

        let mut build = self.executor.spawn(&self.build_cmd, ProcessRole::Build)?;
        let outcome = match build.wait().await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(cycle, error = %err, "lost track of build process");
                ExitOutcome::Failed(-1)
            }
        };

        if !outcome.success() {
            return Err(WatchrunError::BuildFailed {
                command: self.build_cmd.to_string(),
                outcome,
            });
        }

        info!(cycle, "build succeeded");
        Ok(())
    }

    fn start_application(&mut self, cycle: u64) -> Result<()> {
        let app = self
            .executor
            .spawn(&self.run_cmd, ProcessRole::Application)?;
        info!(cycle, pid = ?app.id(), command = %self.run_cmd, "application running");
        self.app = Some(app);
        self.set_state(SupervisorState::Running);
        Ok(())
    }

    /// Forced kill + reap of the current application. No-op when none is
    /// running.
    async fn stop_application(&mut self) -> Result<()> {
        let Some(mut app) = self.app.take() else {
            return Ok(());
        };

        let pid = app.id();
        info!(?pid, command = %app.command(), "killing application");
        app.kill().await?;

        debug!(?pid, "waiting for application to exit");
        match app.wait().await {
            Ok(outcome) => info!(?pid, %outcome, "application exited"),
            Err(err) => warn!(?pid, error = %err, "failed to reap application"),
        }
        Ok(())
    }

    async fn shut_down(&mut self) -> Result<()> {
        self.set_state(SupervisorState::ShuttingDown);
        self.stop_application().await?;
        info!(cycles = self.cycles, "supervisor stopped");
        Ok(())
    }

    fn set_state(&self, state: SupervisorState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, "state transition");
        }
    }
}

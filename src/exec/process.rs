// src/exec/process.rs

//! Real process execution on top of `tokio::process`.

use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::engine::ExitOutcome;
use crate::errors::{Result, WatchrunError};
use crate::exec::backend::{ExecutorBackend, HandleFuture, ProcessHandle};
use crate::exec::output::spawn_drain;
use crate::types::{CommandSpec, ProcessRole};

/// Executor backend that spawns OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutorBackend for RealExecutor {
    type Handle = ChildProcess;

    fn spawn(&mut self, spec: &CommandSpec, role: ProcessRole) -> Result<ChildProcess> {
        ChildProcess::spawn(spec, role)
    }
}

/// A running child process with its output being drained to stdout.
#[derive(Debug)]
pub struct ChildProcess {
    spec: CommandSpec,
    role: ProcessRole,
    child: Child,
}

impl ChildProcess {
    /// Spawn `spec` with piped stdout/stderr and start one drain task per
    /// stream.
    pub fn spawn(spec: &CommandSpec, role: ProcessRole) -> Result<Self> {
        let mut cmd = Command::new(spec.program());
        cmd.args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| WatchrunError::Spawn {
            command: spec.to_string(),
            source,
        })?;

        let pid = child.id();
        info!(%role, command = %spec, ?pid, "process started");

        if let Some(stdout) = child.stdout.take() {
            spawn_drain(stdout, "stdout", role, pid);
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_drain(stderr, "stderr", role, pid);
        }

        Ok(Self {
            spec: spec.clone(),
            role,
            child,
        })
    }
}

impl ProcessHandle for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn command(&self) -> &CommandSpec {
        &self.spec
    }

    fn kill(&mut self) -> HandleFuture<'_, ()> {
        Box::pin(async move {
            let kill_err = |source| WatchrunError::Kill {
                command: self.spec.to_string(),
                source,
            };

            // Already exited on its own: nothing to signal.
            if let Some(status) = self.child.try_wait().map_err(kill_err)? {
                debug!(
                    role = %self.role,
                    command = %self.spec,
                    outcome = %ExitOutcome::from(status),
                    "process already exited; kill is a no-op"
                );
                return Ok(());
            }

            self.child.start_kill().map_err(kill_err)
        })
    }

    fn wait(&mut self) -> HandleFuture<'_, ExitOutcome> {
        Box::pin(async move {
            let status = self
                .child
                .wait()
                .await
                .map_err(|source| WatchrunError::Wait {
                    command: self.spec.to_string(),
                    source,
                })?;
            let outcome = ExitOutcome::from(status);
            debug!(role = %self.role, command = %self.spec, %outcome, "process reaped");
            Ok(outcome)
        })
    }
}

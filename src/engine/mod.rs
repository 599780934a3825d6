// src/engine/mod.rs

//! Supervision engine for watchrun.
//!
//! This module ties together:
//! - the bounded, lossy rebuild queue fed by the file watcher
//! - the supervisor loop that reacts to:
//!   - rebuild signals (kill app → build → run app)
//!   - the shutdown signal
//!
//! The supervisor is the only place that owns process handles; everything
//! else talks to it through the queue or the shutdown channel.

use std::fmt;

/// Outcome of a process as seen by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    /// Non-zero exit code, or -1 when the process was terminated by a signal.
    Failed(i32),
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Success)
    }
}

impl From<std::process::ExitStatus> for ExitOutcome {
    fn from(status: std::process::ExitStatus) -> Self {
        if status.success() {
            ExitOutcome::Success
        } else {
            ExitOutcome::Failed(status.code().unwrap_or(-1))
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Success => f.write_str("success"),
            ExitOutcome::Failed(-1) => f.write_str("terminated by signal"),
            ExitOutcome::Failed(code) => write!(f, "exit code {code}"),
        }
    }
}

/// Why a rebuild was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Synthetic signal injected at startup.
    Startup,
    /// A watched file was created or written.
    FileChange,
}

/// Where the supervisor currently is in its watch → build → run cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Waiting for a rebuild signal, no application running.
    Idle,
    /// A build process is running; rebuild signals stay queued.
    Building,
    /// The application is running; waiting for the next rebuild signal.
    Running,
    /// Terminal.
    ShuttingDown,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SupervisorState::Idle => "idle",
            SupervisorState::Building => "building",
            SupervisorState::Running => "running",
            SupervisorState::ShuttingDown => "shutting-down",
        };
        f.write_str(s)
    }
}

pub mod queue;
pub mod supervisor;

pub use queue::{
    rebuild_queue, Enqueue, RebuildReceiver, RebuildSender, RebuildSignal,
    REBUILD_QUEUE_CAPACITY,
};
pub use supervisor::Supervisor;

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn exit_status_maps_to_outcome() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(
            ExitOutcome::from(std::process::ExitStatus::from_raw(0)),
            ExitOutcome::Success
        );
        // Raw wait status: exit code lives in the high byte.
        assert_eq!(
            ExitOutcome::from(std::process::ExitStatus::from_raw(1 << 8)),
            ExitOutcome::Failed(1)
        );
        // Killed by SIGKILL.
        assert_eq!(
            ExitOutcome::from(std::process::ExitStatus::from_raw(9)),
            ExitOutcome::Failed(-1)
        );
    }

    #[test]
    fn outcome_display() {
        assert_eq!(ExitOutcome::Failed(2).to_string(), "exit code 2");
        assert_eq!(ExitOutcome::Failed(-1).to_string(), "terminated by signal");
    }
}

// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The supervisor talks to an `ExecutorBackend` instead of spawning
//! `tokio::process::Command`s itself. This makes it easy to swap in a fake
//! executor in tests while keeping the production implementation in
//! [`super::process`].
//!
//! - `RealExecutor` spawns OS processes and drains their output to stdout.
//! - Tests can provide a backend whose handles exit on command, record kills,
//!   and never touch the OS.

use std::future::Future;
use std::pin::Pin;

use crate::engine::ExitOutcome;
use crate::errors::Result;
use crate::types::{CommandSpec, ProcessRole};

/// Boxed future returned by [`ProcessHandle`] operations.
pub type HandleFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// One spawned external process.
///
/// A handle is created by [`ExecutorBackend::spawn`], reaped by
/// [`ProcessHandle::wait`] and then dropped. It is never reused.
pub trait ProcessHandle: Send {
    /// OS process identity, if the process has not been reaped yet.
    fn id(&self) -> Option<u32>;

    /// The command this process was spawned from.
    fn command(&self) -> &CommandSpec;

    /// Send a forced termination request. Does not wait for exit.
    ///
    /// Killing a process that already exited on its own succeeds without
    /// doing anything.
    fn kill(&mut self) -> HandleFuture<'_, ()>;

    /// Wait for the process to exit and reap it.
    fn wait(&mut self) -> HandleFuture<'_, ExitOutcome>;
}

/// Trait abstracting how processes are launched.
///
/// Production code uses [`super::RealExecutor`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ExecutorBackend: Send {
    type Handle: ProcessHandle;

    /// Launch `spec` and return immediately.
    ///
    /// Failing to launch is reported as [`crate::errors::WatchrunError::Spawn`].
    fn spawn(&mut self, spec: &CommandSpec, role: ProcessRole) -> Result<Self::Handle>;
}

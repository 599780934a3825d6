// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the build and application
//! commands using `tokio::process::Command`, and for forwarding their output
//! to the console.
//!
//! - [`backend`] provides the `ExecutorBackend` / `ProcessHandle` traits the
//!   supervisor is generic over, so tests can replace real processes.
//! - [`process`] is the production backend.
//! - [`output`] drains child stdout/stderr line by line.

pub mod backend;
pub mod output;
pub mod process;

pub use backend::{ExecutorBackend, HandleFuture, ProcessHandle};
pub use process::{ChildProcess, RealExecutor};

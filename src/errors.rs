// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Variants follow the supervisor's failure taxonomy:
//! - `StartupConfig` is fatal before anything is watched.
//! - `Spawn`, `Kill` and `Wait` carry the command name so logs are
//!   diagnosable on their own.
//! - `BuildFailed` is the one recoverable failure; the supervisor logs it and
//!   goes back to waiting for changes.

use thiserror::Error;

use crate::engine::ExitOutcome;

#[derive(Error, Debug)]
pub enum WatchrunError {
    #[error("Configuration error: {0}")]
    StartupConfig(String),

    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("build '{command}' failed ({outcome})")]
    BuildFailed { command: String, outcome: ExitOutcome },

    #[error("failed to kill '{command}': {source}")]
    Kill {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatchrunError>;

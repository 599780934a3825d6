// src/config/mod.rs

//! Configuration loading and validation for watchrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and resolved settings (`model.rs`).
//! - Load a config file and merge it with the command line (`loader.rs`).
//! - Check required options and compile them (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_from_path, load_settings};
pub use model::{ConfigFile, Settings};
pub use validate::resolve;

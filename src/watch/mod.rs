// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling the `file-pattern` glob (matched against base names).
//! - Enumerating the directories to watch at startup.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Filtering notifications down to create/write events on matching files
//!   and offering rebuild signals to the supervisor's queue.
//!
//! It does **not** know about processes; it only turns filesystem changes
//! into rebuild signals.

pub mod filter;
pub mod patterns;
pub mod walk;
pub mod watcher;

pub use filter::{classify, ChangeKind, EventFilter};
pub use patterns::WatchPattern;
pub use walk::{discover_watch_set, WatchSet};
pub use watcher::{spawn_watcher, WatcherHandle};

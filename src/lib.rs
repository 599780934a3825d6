// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod signal;
pub mod types;
pub mod watch;

use std::path::Path;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_settings, Settings};
use crate::engine::{rebuild_queue, RebuildSignal, Supervisor, REBUILD_QUEUE_CAPACITY};
use crate::errors::Result;
use crate::exec::RealExecutor;
use crate::fs::RealFileSystem;
use crate::signal::{shutdown_channel, spawn_signal_listener};
use crate::watch::{discover_watch_set, spawn_watcher, EventFilter, WatchSet};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - option resolution (CLI + optional config file)
/// - watch-set discovery under the current directory
/// - file watcher → event filter → rebuild queue
/// - signal listener → shutdown channel
/// - the supervisor loop with the real process executor
///
/// Returns once the supervisor has shut down.
pub async fn run(args: CliArgs) -> Result<()> {
    let fs = RealFileSystem;
    let settings = load_settings(&fs, &args)?;

    let root = Path::new(".");
    let watch_set = discover_watch_set(&fs, root)?;

    if args.dry_run {
        print_dry_run(&settings, &watch_set);
        return Ok(());
    }

    let (rebuild_tx, rebuild_rx) = rebuild_queue(REBUILD_QUEUE_CAPACITY);

    let filter = EventFilter::new(settings.file_pattern.clone(), rebuild_tx.clone());
    let _watcher_handle = spawn_watcher(&watch_set, filter)?;

    let (trigger, shutdown) = shutdown_channel();
    spawn_signal_listener(trigger);

    // First build/run happens without waiting for a change.
    info!("queueing initial build");
    rebuild_tx.offer(RebuildSignal::startup());

    let supervisor = Supervisor::new(
        RealExecutor::new(),
        settings.build_cmd,
        settings.run_cmd,
        rebuild_rx,
        shutdown,
    );
    supervisor.run().await
}

/// Simple dry-run output: print resolved commands and watched directories.
fn print_dry_run(settings: &Settings, watch_set: &WatchSet) {
    println!("watchrun dry-run");
    println!("  build-cmd    = {}", settings.build_cmd);
    println!("  run-cmd      = {}", settings.run_cmd);
    println!("  file-pattern = {}", settings.file_pattern);
    println!();

    println!("watching ({}):", watch_set.len());
    for dir in watch_set.iter() {
        println!("  - {}", dir.display());
    }

    debug!("dry-run complete (no execution)");
}

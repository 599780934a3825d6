// src/watch/watcher.rs

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::watch::filter::{classify, EventFilter};
use crate::watch::walk::WatchSet;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    watched: usize,
}

impl WatcherHandle {
    /// Number of directories successfully registered.
    pub fn watched(&self) -> usize {
        self.watched
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("watched", &self.watched)
            .finish()
    }
}

/// Apply the event filter to every path of a notify event.
fn dispatch(filter: &EventFilter, event: &Event) {
    for (path, kind) in classify(event) {
        filter.handle(path, kind);
    }
}

/// Start a filesystem watcher over every directory in `watch_set`.
///
/// Each directory is registered non-recursively, so the watched tree is
/// exactly the startup snapshot. Notifications are filtered synchronously in
/// the notify callback; the filter never blocks, so a slow supervisor cannot
/// stall the notification source.
///
/// A directory that cannot be registered is logged and skipped.
pub fn spawn_watcher(watch_set: &WatchSet, filter: EventFilter) -> Result<WatcherHandle> {
    let pattern = filter.pattern().to_string();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => dispatch(&filter, &event),
            Err(err) => warn!(error = %err, "file watch error"),
        },
        Config::default(),
    )?;

    let mut watched = 0;
    for dir in watch_set.iter() {
        match watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => {
                debug!(?dir, "watching directory");
                watched += 1;
            }
            Err(err) => warn!(?dir, error = %err, "error while adding directory to watcher"),
        }
    }

    info!(directories = watched, %pattern, "file watcher started");

    Ok(WatcherHandle {
        _inner: watcher,
        watched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rebuild_queue;
    use crate::watch::patterns::WatchPattern;
    use notify::event::{CreateKind, EventKind, ModifyKind, RemoveKind, RenameMode};
    use std::path::PathBuf;

    #[test]
    fn dispatch_offers_one_signal_per_matching_path() {
        let (tx, rx) = rebuild_queue(5);
        let filter = EventFilter::new(WatchPattern::new("*.txt").unwrap(), tx);

        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("./a.txt"))
            .add_path(PathBuf::from("./b.bin"));
        dispatch(&filter, &event);
        assert_eq!(rx.len(), 1);

        let removed = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("./a.txt"));
        dispatch(&filter, &removed);
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn rename_onto_matching_name_offers_a_signal() {
        let (tx, rx) = rebuild_queue(5);
        let filter = EventFilter::new(WatchPattern::new("*.txt").unwrap(), tx);

        // Source matches too, but only the destination counts.
        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("./old.txt"))
            .add_path(PathBuf::from("./new.txt"));
        dispatch(&filter, &event);
        assert_eq!(rx.len(), 1);

        let moved_away = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("./notes.txt"))
            .add_path(PathBuf::from("./notes.bak"));
        dispatch(&filter, &moved_away);
        assert_eq!(rx.len(), 1);
    }
}

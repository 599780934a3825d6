// src/watch/filter.rs

//! Decides which filesystem notifications warrant a rebuild.

use std::path::Path;

use notify::event::{Event, EventKind, ModifyKind, RenameMode};
use tracing::debug;

use crate::engine::{Enqueue, RebuildSender, RebuildSignal};
use crate::watch::patterns::WatchPattern;

/// Simplified operation kind of a filesystem notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Create,
    Write,
    Remove,
    Rename,
    Other,
}

impl From<&EventKind> for ChangeKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => ChangeKind::Create,
            // A file moved into place is a new file under its new name.
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => ChangeKind::Create,
            EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Rename,
            EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::Other,
            EventKind::Modify(_) => ChangeKind::Write,
            EventKind::Remove(_) => ChangeKind::Remove,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => ChangeKind::Other,
        }
    }
}

impl ChangeKind {
    /// Only creations and content writes trigger rebuilds.
    pub fn triggers_rebuild(self) -> bool {
        matches!(self, ChangeKind::Create | ChangeKind::Write)
    }
}

/// Split a notify event into one classified change per path.
///
/// A two-path rename (`RenameMode::Both`) reports `[from, to]`; the
/// destination is classified as a creation and the source as a rename.
pub fn classify(event: &Event) -> Vec<(&Path, ChangeKind)> {
    if let EventKind::Modify(ModifyKind::Name(RenameMode::Both)) = event.kind {
        return event
            .paths
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let kind = if i == 1 {
                    ChangeKind::Create
                } else {
                    ChangeKind::Rename
                };
                (path.as_path(), kind)
            })
            .collect();
    }

    let kind = ChangeKind::from(&event.kind);
    event.paths.iter().map(|path| (path.as_path(), kind)).collect()
}

/// Turns raw notifications into rebuild signals.
#[derive(Debug, Clone)]
pub struct EventFilter {
    pattern: WatchPattern,
    rebuilds: RebuildSender,
}

impl EventFilter {
    pub fn new(pattern: WatchPattern, rebuilds: RebuildSender) -> Self {
        Self { pattern, rebuilds }
    }

    pub fn pattern(&self) -> &WatchPattern {
        &self.pattern
    }

    /// Whether a notification is relevant at all.
    pub fn is_relevant(&self, path: &Path, kind: ChangeKind) -> bool {
        kind.triggers_rebuild() && self.pattern.matches_path(path)
    }

    /// Offer a rebuild for a relevant notification.
    ///
    /// Returns `None` for irrelevant notifications, otherwise what the queue
    /// did with the signal. Never blocks.
    pub fn handle(&self, path: &Path, kind: ChangeKind) -> Option<Enqueue> {
        if !self.is_relevant(path, kind) {
            return None;
        }

        let outcome = self.rebuilds.offer(RebuildSignal::file_change());
        debug!(?path, ?kind, ?outcome, "watched file changed");
        Some(outcome)
    }
}

// src/watch/walk.rs

//! Startup enumeration of the directories to watch.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::fs::FileSystem;

/// Directories under supervision.
///
/// Built once at startup. The set only ever grows; directories created after
/// startup are not discovered, and deleted directories are not removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSet {
    dirs: BTreeSet<PathBuf>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory. Returns `false` if it was already present.
    pub fn insert(&mut self, dir: impl Into<PathBuf>) -> bool {
        self.dirs.insert(dir.into())
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.contains(dir)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// Hidden means dot-prefixed base name (`.git`, `.cache`, ...).
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Recursively collect `root` and every directory below it, skipping hidden
/// directories and their whole subtree. The root itself is always included,
/// even when its own name starts with a dot.
///
/// Unreadable subdirectories are logged and skipped; an unreadable root is an
/// error.
pub fn discover_watch_set(fs: &dyn FileSystem, root: &Path) -> Result<WatchSet> {
    if !fs.is_dir(root) {
        return Err(anyhow!("watch root {:?} is not a directory", root).into());
    }

    let mut set = WatchSet::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let subdirs = match fs.list_subdirs(&dir) {
            Ok(subdirs) => subdirs,
            Err(err) if dir == root => return Err(err.into()),
            Err(err) => {
                warn!(?dir, error = %err, "cannot read directory; not watching it");
                continue;
            }
        };

        debug!(?dir, "watching directory");
        set.insert(dir);

        for path in subdirs {
            if is_hidden(&path) {
                debug!(?path, "skipping hidden directory");
                continue;
            }
            stack.push(path);
        }
    }

    Ok(set)
}

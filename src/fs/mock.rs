// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

/// In-memory tree rooted at `"."`.
///
/// Paths are expected to be written relative to the root with a leading
/// `./` (e.g. `"./src/main.rs"`), matching what `list_subdirs` hands back.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Add a file, creating parent directories as needed.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();
        entries.insert(path.to_path_buf(), MockEntry::File(content.into()));
        Self::link_to_parent(&mut entries, path);
    }

    /// Add an (empty) directory, creating parents as needed.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_dir(&mut entries, path);
    }

    fn parent_of(path: &Path) -> Option<&Path> {
        let parent = path.parent()?;
        if parent.as_os_str().is_empty() {
            Some(Path::new("."))
        } else {
            Some(parent)
        }
    }

    fn ensure_dir(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if entries.contains_key(path) {
            return;
        }
        entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        Self::link_to_parent(entries, path);
    }

    fn link_to_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = Self::parent_of(path) else {
            return;
        };
        if parent == path {
            return;
        }
        Self::ensure_dir(entries, parent);
        if let (Some(MockEntry::Dir(children)), Some(name)) = (
            entries.get_mut(parent),
            path.file_name().and_then(|n| n.to_str()),
        ) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let entries = self.entries.lock().unwrap();
        matches!(entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn list_subdirs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = self.entries.lock().unwrap();
        let Some(MockEntry::Dir(children)) = entries.get(dir) else {
            return Err(anyhow!("Not a directory or not found: {:?}", dir));
        };

        let mut dirs: Vec<PathBuf> = children
            .iter()
            .map(|name| dir.join(name))
            .filter(|path| matches!(entries.get(path), Some(MockEntry::Dir(_))))
            .collect();
        dirs.sort();
        Ok(dirs)
    }
}

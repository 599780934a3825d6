// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// The slice of the filesystem that startup needs: reading the config file
/// and enumerating directories for the watch set.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate subdirectories of `dir` as full paths, sorted.
    ///
    /// Symlinks are not followed, so a link pointing back up the tree cannot
    /// make a walk loop.
    fn list_subdirs(&self, dir: &Path) -> Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading file {:?}", path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_subdirs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("listing {:?}", dir))? {
            let entry = entry.with_context(|| format!("listing {:?}", dir))?;
            let file_type = entry
                .file_type()
                .with_context(|| format!("inspecting {:?}", entry.path()))?;
            if file_type.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}

// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::Context;
use globset::{Glob, GlobMatcher};

use crate::errors::{Result, WatchrunError};

/// Compiled `file-pattern` glob.
///
/// Only the base name of a path is matched, so `*.go` matches
/// `cmd/server/main.go`. Matching is case-sensitive and supports `*`, `?`
/// and character classes.
#[derive(Clone)]
pub struct WatchPattern {
    raw: String,
    matcher: GlobMatcher,
}

impl fmt::Debug for WatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WatchPattern").field(&self.raw).finish()
    }
}

impl fmt::Display for WatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl WatchPattern {
    /// Compile a pattern. Empty patterns are rejected.
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.trim().is_empty() {
            return Err(WatchrunError::StartupConfig(
                "file-pattern must not be empty".to_string(),
            ));
        }

        let glob = Glob::new(pattern)
            .with_context(|| format!("invalid glob pattern: {pattern}"))
            .map_err(|e| WatchrunError::StartupConfig(format!("{e:#}")))?;

        Ok(Self {
            raw: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match against a bare file name.
    pub fn matches_name(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }

    /// Match against the base name of `path`, ignoring directories.
    pub fn matches_path(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => self.matcher.is_match(Path::new(name)),
            None => false,
        }
    }
}

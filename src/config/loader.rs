// src/config/loader.rs

use std::path::Path;

use anyhow::Context;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, Settings};
use crate::config::validate::resolve;
use crate::errors::Result;
use crate::fs::FileSystem;

/// Load a configuration file from a given path and return the raw
/// `ConfigFile`.
///
/// This only performs TOML deserialization; presence of required options is
/// checked later, once the command line has been merged in.
pub fn load_from_path(fs: &dyn FileSystem, path: &Path) -> Result<ConfigFile> {
    let contents = fs
        .read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: ConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Resolve the final settings from the command line and, if given, the
/// `--config` file.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_settings(fs: &dyn FileSystem, args: &CliArgs) -> Result<Settings> {
    let file = match &args.config {
        Some(path) => load_from_path(fs, path)?,
        None => ConfigFile::default(),
    };

    resolve(file.merge_cli(args))
}

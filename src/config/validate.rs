// src/config/validate.rs

use crate::config::model::{ConfigFile, Settings};
use crate::errors::{Result, WatchrunError};
use crate::types::CommandSpec;
use crate::watch::WatchPattern;

/// Turn merged options into [`Settings`].
///
/// This checks:
/// - all of `build-cmd`, `run-cmd` and `file-pattern` are present and not
///   blank (every missing option is named in one error)
/// - `file-pattern` compiles as a glob
pub fn resolve(cfg: ConfigFile) -> Result<Settings> {
    let missing: Vec<&str> = [
        ("--build-cmd", &cfg.build_cmd),
        ("--run-cmd", &cfg.run_cmd),
        ("--file-pattern", &cfg.file_pattern),
    ]
    .into_iter()
    .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
    .map(|(flag, _)| flag)
    .collect();

    if !missing.is_empty() {
        return Err(WatchrunError::StartupConfig(format!(
            "missing required option(s): {}",
            missing.join(", ")
        )));
    }

    Ok(Settings {
        build_cmd: command(cfg.build_cmd.as_deref(), "--build-cmd")?,
        run_cmd: command(cfg.run_cmd.as_deref(), "--run-cmd")?,
        file_pattern: WatchPattern::new(cfg.file_pattern.as_deref().unwrap_or_default())?,
    })
}

fn command(value: Option<&str>, flag: &str) -> Result<CommandSpec> {
    value
        .unwrap_or_default()
        .parse()
        .map_err(|e| WatchrunError::StartupConfig(format!("{flag}: {e}")))
}

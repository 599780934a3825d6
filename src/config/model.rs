// src/config/model.rs

use serde::Deserialize;

use crate::cli::CliArgs;
use crate::types::CommandSpec;
use crate::watch::WatchPattern;

/// Options as read from a TOML file.
///
/// ```toml
/// build-cmd = "go build -o my-app"
/// run-cmd = "./my-app"
/// file-pattern = "*.go"
/// ```
///
/// Every key is optional here; presence is checked after the file has been
/// merged with the command line (see [`super::validate::resolve`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub build_cmd: Option<String>,
    pub run_cmd: Option<String>,
    pub file_pattern: Option<String>,
}

impl ConfigFile {
    /// Overlay command-line values on top of this file.
    pub fn merge_cli(self, args: &CliArgs) -> ConfigFile {
        ConfigFile {
            build_cmd: args.build_cmd.clone().or(self.build_cmd),
            run_cmd: args.run_cmd.clone().or(self.run_cmd),
            file_pattern: args.file_pattern.clone().or(self.file_pattern),
        }
    }
}

/// Fully resolved, validated options the supervisor runs with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub build_cmd: CommandSpec,
    pub run_cmd: CommandSpec,
    pub file_pattern: WatchPattern,
}

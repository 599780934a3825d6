// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! `--build-cmd`, `--run-cmd` and `--file-pattern` are required, but they may
//! come from a `--config` file instead of the command line, so clap sees them
//! as optional and [`crate::config`] enforces presence after merging.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueEnum};

/// Command-line arguments for `watchrun`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "watchrun",
    version,
    about = "Rebuild and restart an application whenever watched files change.",
    long_about = None
)]
pub struct CliArgs {
    /// The command to run to process changed files, e.g. "go build".
    #[arg(long, value_name = "CMD")]
    pub build_cmd: Option<String>,

    /// The command to run after files are processed, e.g. "./my-app".
    #[arg(long, value_name = "CMD")]
    pub run_cmd: Option<String>,

    /// Files to monitor for changes, e.g. "*.go". Matched against base names.
    #[arg(long, value_name = "GLOB")]
    pub file_pattern: Option<String>,

    /// Optional TOML file providing any of the options above.
    ///
    /// Values given on the command line take precedence.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve options and the watch set, print them, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

/// Rendered `--help` text, printed on startup configuration errors.
pub fn usage() -> String {
    CliArgs::command().render_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_options() {
        let args = CliArgs::try_parse_from([
            "watchrun",
            "--build-cmd",
            "go build",
            "--run-cmd",
            "./app --port 8080",
            "--file-pattern",
            "*.go",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.build_cmd.as_deref(), Some("go build"));
        assert_eq!(args.run_cmd.as_deref(), Some("./app --port 8080"));
        assert_eq!(args.file_pattern.as_deref(), Some("*.go"));
        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert!(!args.dry_run);
    }

    #[test]
    fn required_options_are_deferred_to_config_resolution() {
        let args = CliArgs::try_parse_from(["watchrun"]).unwrap();
        assert!(args.build_cmd.is_none());
        assert!(args.run_cmd.is_none());
        assert!(args.file_pattern.is_none());
    }

    #[test]
    fn usage_mentions_every_option() {
        let text = usage();
        for flag in ["--build-cmd", "--run-cmd", "--file-pattern", "--config"] {
            assert!(text.contains(flag), "usage is missing {flag}");
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }
}

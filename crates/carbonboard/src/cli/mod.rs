//! Command-line interface for carbonboard.
//!
//! This module provides the CLI structure for the `carbonboard` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{ConfigCommand, ServeCommand, StatusCommand};

/// carbonboard - Record and chart carbon-emission factors
///
/// Serves a small web dashboard for adding, editing and comparing the
/// tonCO2eq figures of vehicle models, backed by a local `SQLite` file.
#[derive(Debug, Parser)]
#[command(name = "carbonboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server
    Serve(ServeCommand),

    /// Show database statistics
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "carbonboard");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        assert_eq!(cli_with(2, true).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["carbonboard", "serve"]).unwrap();
        assert!(matches!(cli.command, Command::Serve(_)));
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "carbonboard",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--no-live-reload",
        ])
        .unwrap();
        let Command::Serve(cmd) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(cmd.bind.as_deref(), Some("0.0.0.0:8080"));
        assert!(cmd.no_live_reload);
        assert!(!cmd.live_reload);
    }

    #[test]
    fn test_live_reload_flags_conflict() {
        let result = Cli::try_parse_from([
            "carbonboard",
            "serve",
            "--live-reload",
            "--no-live-reload",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_status_json() {
        let cli = Cli::try_parse_from(["carbonboard", "status", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Status(StatusCommand { json: true })
        ));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["carbonboard", "config", "validate", "-f", "/tmp/c.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli =
            Cli::try_parse_from(["carbonboard", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["carbonboard", "serve", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}

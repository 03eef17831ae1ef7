//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::Config;

/// Serve command arguments.
#[derive(Debug, Default, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.bind_address`)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Database file (overrides `storage.database_path`)
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Template directory (overrides `templates.directory`)
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Re-read templates on every request
    #[arg(long, conflicts_with = "no_live_reload")]
    pub live_reload: bool,

    /// Load templates once at startup
    #[arg(long)]
    pub no_live_reload: bool,
}

impl ServeCommand {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(bind) = &self.bind {
            config.server.bind_address.clone_from(bind);
        }
        if let Some(database) = &self.database {
            config.storage.database_path = Some(database.clone());
        }
        if let Some(templates) = &self.templates {
            config.templates.directory.clone_from(templates);
        }
        if self.live_reload {
            config.templates.live_reload = true;
        } else if self.no_live_reload {
            config.templates.live_reload = false;
        }
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_apply_overrides() {
        let mut config = Config::default();
        let cmd = ServeCommand {
            bind: Some("0.0.0.0:8080".to_string()),
            database: Some(PathBuf::from("/tmp/carbon.db")),
            templates: Some(PathBuf::from("/srv/views")),
            live_reload: false,
            no_live_reload: true,
        };
        cmd.apply(&mut config);

        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/carbon.db"));
        assert_eq!(config.templates.directory, PathBuf::from("/srv/views"));
        assert!(!config.templates.live_reload);
    }

    #[test]
    fn test_serve_apply_without_flags_keeps_config() {
        let mut config = Config::default();
        ServeCommand::default().apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_serve_live_reload_flag() {
        let mut config = Config::default();
        config.templates.live_reload = false;
        ServeCommand {
            live_reload: true,
            ..ServeCommand::default()
        }
        .apply(&mut config);
        assert!(config.templates.live_reload);
    }
}

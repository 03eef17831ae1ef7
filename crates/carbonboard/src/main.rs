//! `carbonboard` - CLI for the carbon-emission dashboard
//!
//! This binary runs the web server and offers a few maintenance commands
//! for inspecting the database and configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use carbonboard::cli::{Cli, Command, ConfigCommand, ServeCommand};
use carbonboard::{http, init_logging, AppState, Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // Execute the command
    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, &serve_cmd).await,
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    cmd.apply(&mut config);
    config.validate().context("invalid command-line overrides")?;

    let addr = config.bind_address()?;
    let state = AppState::from_config(&config).with_context(|| {
        format!(
            "failed to start with database {} and templates {}",
            config.database_path().display(),
            config.templates.directory.display()
        )
    })?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    http::serve(listener, state, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let path = config.database_path();
    let stats = Storage::open(&path)?.stats()?;
    let average = stats
        .average_ton_co2eq
        .map_or_else(|| "n/a".to_string(), |avg| format!("{avg:.3}"));
    let last_updated = stats
        .last_updated
        .map_or_else(|| "never".to_string(), |ts| ts.to_rfc3339());

    if json {
        let status = serde_json::json!({
            "database_path": path,
            "emission_factors": stats.emission_factors,
            "yearly_emissions": stats.yearly_emissions,
            "average_ton_co2eq": stats.average_ton_co2eq,
            "last_updated": stats.last_updated,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("carbonboard status");
        println!("------------------");
        println!("Database:          {}", path.display());
        println!("Emission factors:  {}", stats.emission_factors);
        println!("Yearly rows:       {}", stats.yearly_emissions);
        println!("Average tonCO2eq:  {average}");
        println!("Last updated:      {last_updated}");
        println!("Size on disk:      {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.server.bind_address);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Templates]");
                println!(
                    "  Directory:          {}",
                    config.templates.directory.display()
                );
                println!("  Live reload:        {}", config.templates.live_reload);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

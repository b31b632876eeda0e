use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tl_cli::commands::{report, stats, status, track};
use tl_cli::{Cli, Commands, Config};

/// Load config and open the event store, ensuring the parent directory
/// exists.
fn open_store(config_path: Option<&Path>) -> Result<(tl_db::EventStore, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let store =
        tl_db::EventStore::open(&config.database_path).context("failed to open event store")?;
    Ok((store, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Start) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            track::start(store)?;
        }
        Some(Commands::Pause { reason }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            track::pause(store, reason)?;
        }
        Some(Commands::Resume) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            track::resume(store)?;
        }
        Some(Commands::End) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            track::end(store)?;
        }
        Some(Commands::Status) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            status::run(&mut std::io::stdout(), store)?;
        }
        Some(Commands::Stats {
            week,
            month,
            date,
            from,
            to,
            json,
        }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            let range = stats::select_range(*week, *month, *date, *from, *to)?;
            stats::run(&mut std::io::stdout(), &store, range, *json)?;
        }
        Some(Commands::Report { date, output }) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let output_dir = output.as_deref().unwrap_or(&config.report_dir);
            let path = report::run(&store, date, output_dir)?;
            println!("Report written to {}", path.display());
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}

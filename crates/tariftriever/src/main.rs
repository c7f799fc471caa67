//! Tariftriever command line
//!
//! Runs the HTTP API, resolves single queries from the terminal, prints miss
//! statistics and applies database migrations.

mod commands;
mod logging;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tariftriever_common::Language;
use tariftriever_config::source::{ConfigurationLoader, EnvironmentSource, file_source};
use tariftriever_config::{ApplicationConfig, Profile};
use tracing::debug;

/// Hybrid tariff code resolver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional configuration file (TOML, or YAML by extension)
    #[arg(long, short = 'c', global = true)]
    config_file: Option<PathBuf>,

    /// Configuration profile applied before the file and environment
    #[arg(long, global = true)]
    profile: Option<Profile>,

    /// Also write a daily rolling log file into this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Bind address, overrides `api.host`/`api.port`
        #[arg(long)]
        addr: Option<String>,
    },
    /// Resolve one query and print the ranked candidates
    Resolve {
        /// Free text or a (partial) tariff code
        query: String,
        /// Query language: ru, uz, en or another 2-3 letter ISO code
        #[arg(long, short = 'l', default_value = "ru")]
        language: Language,
        /// Caller id stored with a miss
        #[arg(long)]
        user_id: Option<i64>,
    },
    /// Print miss statistics
    Stats {
        /// Number of latest misses to list
        #[arg(long)]
        recent: Option<usize>,
    },
    /// Apply database migrations
    Migrate,
}

fn load_config(args: &Args) -> anyhow::Result<ApplicationConfig> {
    let mut base = ApplicationConfig::default();
    if let Some(profile) = args.profile {
        profile.apply(&mut base);
    }

    let mut loader = ConfigurationLoader::new().with_base(base);
    if let Some(path) = &args.config_file {
        loader = loader.add_source(file_source(path));
    }
    loader = loader.add_source(Box::new(EnvironmentSource));

    loader.load().context("Failed to load configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tariftriever_common::initialize_environment();

    let args = Args::parse();
    let config = load_config(&args)?;

    // The server always keeps a log file; one-shot commands only when asked
    let log_dir = args
        .log_dir
        .clone()
        .or_else(|| config.telemetry.log_dir.clone())
        .or_else(|| matches!(args.command, Command::Serve { .. }).then(logging::default_log_dir));
    let _log_guards = logging::init(&config.telemetry, log_dir.as_deref())?;

    debug!(command = ?args.command, "Configuration loaded");

    match args.command {
        Command::Serve { addr } => commands::serve(&config, addr).await,
        Command::Resolve {
            query,
            language,
            user_id,
        } => commands::resolve(&config, query, language, user_id).await,
        Command::Stats { recent } => commands::stats(&config, recent).await,
        Command::Migrate => commands::migrate(&config).await,
    }
}

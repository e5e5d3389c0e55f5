use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::commands;
use portal_core::approvals::Decision;
use portal_core::config::{load_config, ConfigKey, CONFIG_PATH_ENV};

#[derive(Parser)]
#[command(name = "portal")]
#[command(version, about = "Output port usage charts and pending request inbox for the data portal")]
struct Cli {
    /// Use an alternate config file
    #[arg(long, global = true, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chart query usage of an output port per consuming data product
    Usage(commands::usage::UsageArgs),

    /// List and decide pending access requests
    Pending {
        #[command(subcommand)]
        action: PendingCommands,
    },

    /// Start the local API server
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum PendingCommands {
    /// List pending requests
    List(commands::pending::ListArgs),

    /// Accept a pending request
    Accept(commands::pending::DecideArgs),

    /// Reject a pending request
    Reject(commands::pending::DecideArgs),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the current configuration
    Show,

    /// Update one configuration value
    Set {
        #[arg(value_enum)]
        key: ConfigKey,
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Must happen before the runtime spawns worker threads
    if let Some(path) = &cli.config {
        std::env::set_var(CONFIG_PATH_ENV, path);
    }

    init_tracing();

    tokio::runtime::Runtime::new()?.block_on(run(cli.command))
}

fn init_tracing() {
    let default_level = load_config()
        .map(|config| config.log_level)
        .unwrap_or_else(|_| "warn".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Usage(args) => commands::usage::run(args).await,
        Commands::Pending { action } => match action {
            PendingCommands::List(args) => commands::pending::list(args).await,
            PendingCommands::Accept(args) => commands::pending::decide(args, Decision::Accept).await,
            PendingCommands::Reject(args) => commands::pending::decide(args, Decision::Reject).await,
        },
        Commands::Serve { port } => commands::serve::run(port).await,
        Commands::Config { action } => match action {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Set { key, value } => commands::config::set(key, &value),
        },
    }
}

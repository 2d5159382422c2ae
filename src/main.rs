//! lender-notes CLI - credential-resolving router for lender application notes
//!
//! Run `lender-notes --help` for usage information.

use clap::{Parser, Subcommand};
use lender_notes::config::{Config, ConfigCheck, LogFormat, LoggingConfig};
use lender_notes::server::NotesDispatcher;
use lender_notes::web::WebServer;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "lender-notes",
    about = "Routes lender notes lookups to RouteOne and CUDL using per-store credentials",
    version
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Address to bind to (overrides config and PORT)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Check store aliases, credential buckets and adapter endpoints
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        Config::load(config_path).await?
    } else {
        let default_path = Config::default_path();
        if default_path.exists() {
            Config::load(&default_path).await?
        } else {
            Config::default()
        }
    }
    .with_env()?;

    init_logging(&config.logging, cli.verbose);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Failed to load environment file"),
    }

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => run_server(config, bind).await?,
        Commands::Check => check_config(&config)?,
    }

    Ok(())
}

/// Setup logging
fn init_logging(logging: &LoggingConfig, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level)),
        1 => EnvFilter::from_default_env().add_directive(Level::DEBUG.into()),
        _ => EnvFilter::from_default_env().add_directive(Level::TRACE.into()),
    };

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Run the HTTP server
async fn run_server(
    config: Config,
    bind: Option<SocketAddr>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dispatcher = NotesDispatcher::from_config(&config)?;
    let server = WebServer::new(bind.unwrap_or(config.server.bind), dispatcher);

    server.run().await.map_err(|e| e as Box<dyn std::error::Error>)
}

/// Print a configuration report without revealing secrets
///
/// Fails when a store alias points at a missing credential bucket.
fn check_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let vault = config.credential_vault();
    let check = ConfigCheck::new(config, &vault);

    print!("{}", check);
    check.verify()?;
    Ok(())
}

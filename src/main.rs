use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use patient_dashboard::assistant::AssistantError;
use patient_dashboard::config::{self, AppConfig, ConfigError, APP_VERSION};
use patient_dashboard::core_state::CoreState;
use patient_dashboard::db::DatabaseError;
use patient_dashboard::seed::{self, SeedError};
use patient_dashboard::{api, init_tracing};

#[derive(Debug, Parser)]
#[command(name = "patient-dashboard", version, about = "Patient records dashboard backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default).
    Serve(ServeArgs),
    /// Load the bundled demo patients.
    Seed {
        /// Remove existing demo patients before seeding.
        #[arg(long)]
        reset: bool,
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Args)]
struct ServeArgs {
    #[arg(long)]
    host: Option<IpAddr>,
    #[arg(long, short)]
    port: Option<u16>,
    #[arg(long)]
    database: Option<PathBuf>,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

async fn serve(mut config: AppConfig, args: ServeArgs) -> Result<(), CliError> {
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }

    let core = Arc::new(CoreState::from_config(&config)?);
    // Create and migrate the database up front.
    core.open_db()?;
    tracing::info!(database = %config.database_path.display(), "Database ready");

    if config.gemini.api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; chat and AI diagnosis will fail");
    }

    let server = api::start_server(core, config.bind_addr(), &config.cors_origins).await?;
    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl-C received, shutting down");
    server.stop().await;
    Ok(())
}

fn seed_database(
    mut config: AppConfig,
    reset: bool,
    database: Option<PathBuf>,
) -> Result<(), CliError> {
    if let Some(database) = database {
        config.database_path = database;
    }
    let conn = CoreState::from_config(&config)?.open_db()?;
    let summary = seed::seed_database(&conn, reset)?;
    tracing::info!(
        database = %config.database_path.display(),
        removed = summary.removed,
        inserted = summary.inserted,
        updated = summary.updated,
        "Seed complete"
    );
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::from_env()?;
    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(config, args).await,
        Command::Seed { reset, database } => seed_database(config, reset, database),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = config::load_dotenv();
    init_tracing();
    match dotenv {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Ok(None) => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {e}"),
    }

    let cli = Cli::parse();
    tracing::info!("Patient dashboard starting v{APP_VERSION}");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

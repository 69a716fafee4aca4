//! # Studyhall Server
//!
//! Binary entry point: loads layered configuration, connects the store
//! (PostgreSQL or in-memory) and serves the `/api/v1` router.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studyhall_core::database::{InMemoryStore, PostgresDatabase};
use studyhall_server::{
    AppState, create_app,
    infra::config::{Config, ConfigLoad, ConfigLoader},
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "studyhall-server")]
#[command(about = "Student social platform API: feeds, comment threads, likes and bookmarks")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to a studyhall.toml configuration file
    #[arg(long, env = "STUDYHALL_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Path to a .env file (defaults to ./.env when present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// PostgreSQL connection string (overrides config)
    #[arg(long)]
    database_url: Option<String>,

    /// Keep all data in process memory instead of PostgreSQL
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "studyhall_server=info,studyhall_core=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(command) = cli.command {
        match command {
            Command::Db(DbCommand::Migrate) => {
                run_db_migrate(&cli.serve).await?;
                return Ok(());
            }
        }
    }

    run_server(cli.serve).await
}

async fn run_db_migrate(args: &ServeArgs) -> anyhow::Result<()> {
    let config = load_runtime_config(args)?;
    let database_url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL is required to run migrations")?;
    let pg = PostgresDatabase::connect(database_url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL for migration")?;
    pg.initialize_schema()
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = args.config.clone() {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = args.env_file.clone() {
        loader = loader.with_env_file(path);
    }

    let ConfigLoad { config, warnings } = loader
        .load_with_overrides(|env| {
            if let Some(port) = args.port {
                env.server_port = Some(port);
            }
            if let Some(host) = args.host.clone() {
                env.server_host = Some(host);
            }
            if let Some(url) = args.database_url.clone() {
                env.database_url = Some(url);
            }
            if args.in_memory {
                env.in_memory = Some(true);
            }
        })
        .context("failed to load configuration")?;

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }

    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }

    let limits = &config.pagination;
    info!(
        pagination.feed_max = limits.feed.max,
        pagination.comments_max = limits.comments.max,
        pagination.replies_max = limits.replies.max,
        pagination.saved_max = limits.saved.max,
        "pagination limits in effect"
    );

    Ok(config)
}

async fn build_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    if config.storage.in_memory {
        info!("using in-memory store");
        return Ok(AppState::in_memory(&InMemoryStore::new(), config));
    }

    let database_url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL is required unless --in-memory is set")?;
    let db = PostgresDatabase::connect(database_url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL")?;
    db.initialize_schema()
        .await
        .context("database migration failed")?;

    Ok(AppState::from_postgres(Arc::new(db), config))
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let config = Arc::new(load_runtime_config(&args)?);
    let state = build_state(Arc::clone(&config)).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server host/port")?;

    info!(
        "Starting Studyhall server (HTTP) on {}:{}",
        config.server.host, config.server.port
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}

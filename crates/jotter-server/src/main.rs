//! Jotter server
//!
//! HTTP/JSON API for owner-scoped notes.
//!
//! Default: http://127.0.0.1:5000/

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jotter_core::{Config, NoteService};

mod auth;
mod error;
mod routes;

use routes::{create_router, AppState};

#[derive(Parser)]
#[command(name = "jotter-server")]
#[command(about = "Jotter - personal notes server")]
#[command(version)]
struct Args {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config)
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load_with_cli_override(args.config.as_ref())?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }

    init_logging(&config)?;

    let service = NoteService::open(&config).map_err(|err| {
        let context = format!("Failed to open note store at {:?}", config.sqlite_path());
        let context = match err.recovery_suggestion() {
            Some(hint) => format!("{}. {}", context, hint),
            None => context,
        };
        anyhow::Error::new(err).context(context)
    })?;
    let state = AppState::new(service, &config.owner_header)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!(
        "Jotter server listening on http://{} (owner header: {})",
        config.listen_addr, config.owner_header
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Log to stderr, or to `log_file` when one is configured
fn init_logging(config: &Config) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jotter_core=info,jotter_server=info,tower_http=info"));

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Could not open log file {:?}", path))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

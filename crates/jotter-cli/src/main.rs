//! Jotter CLI
//!
//! Command-line client for a Jotter notes server.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jotter_core::Config;

mod client;
mod commands;
mod editor;
mod output;

use client::ApiClient;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "jotter")]
#[command(about = "Jotter - personal notes with autosave, search and PDF export")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List notes, most recently modified first
    #[command(alias = "ls")]
    List {
        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Show a note
    Show {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Create a note
    #[command(alias = "add")]
    New {
        /// Note title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Note content (opens editor if not provided)
        #[arg(short, long)]
        content: Option<String>,
        /// Tags to add
        #[arg(short, long)]
        tag: Vec<String>,
    },
    /// Edit a note's content in $EDITOR
    Edit {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Write into a note from stdin with autosave
    Write {
        /// Note ID to append to (creates a new note if omitted)
        id: Option<String>,
        /// Set the note title
        #[arg(short = 'T', long)]
        title: Option<String>,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Search notes by title and content
    Search {
        /// Search query (case-insensitive)
        query: String,
    },
    /// Export a note as PDF
    Export {
        /// Note ID (full UUID or prefix)
        id: String,
        /// Output file (defaults to the note title)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List all tags
    Tags,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (server_url, owner, autosave_delay_ms, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work without a server or an owner
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config = Config::load_with_cli_override(config_path)?;
    init_logging(&config);

    let client = ApiClient::from_config(&config)?;

    match cli.command {
        Commands::List { tag } => commands::note::list(&client, tag, &output).await,
        Commands::Show { id } => commands::note::show(&client, id, &output).await,
        Commands::New {
            title,
            content,
            tag,
        } => commands::note::create(&client, title, content, tag, &output).await,
        Commands::Edit { id } => commands::note::edit(&client, id, &output).await,
        Commands::Write { id, title } => {
            commands::write::write(client, id, title, config.autosave_delay(), &output).await
        }
        Commands::Delete { id } => commands::note::delete(&client, id, &output).await,
        Commands::Search { query } => commands::note::search(&client, query, &output).await,
        Commands::Export { id, output: path } => {
            commands::note::export(&client, id, path, &output).await
        }
        Commands::Tags => commands::note::tags(&client, &output).await,
        Commands::Config { .. } => Ok(()),
    }
}

/// File logging, enabled only when JOTTER_LOG is set
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("JOTTER_LOG") else {
        return;
    };

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("jotter_core={},jotter={}", log_level, log_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}

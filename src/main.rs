//! # Grounded RAG CLI (`grag`)
//!
//! ## Usage
//!
//! ```bash
//! grag --config ./config/grag.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `grag init` | Write a default config (if missing) and create the database |
//! | `grag ingest` | Rebuild the index from the data directory |
//! | `grag search "<query>"` | Print the chunks ranked for a query |
//! | `grag ask "<query>"` | Answer a question grounded on the index |
//! | `grag stats` | Summarize the index |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).
//! A missing credential or disabled provider exits with status 2 and a
//! "service not configured" message.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use grounded_rag::config::{self, Config};
use grounded_rag::progress::ProgressMode;
use grounded_rag::{ask, db, ingest, migrate, search, stats};
use grounded_rag_core::RagError;

/// Grounded RAG: answer questions from your own documents.
#[derive(Parser)]
#[command(
    name = "grag",
    about = "Grounded RAG: retrieval-augmented answers over a local document directory",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/grag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file if none exists, then create the database
    /// schema. Idempotent.
    Init,

    /// Rebuild the index from every accepted file in the data directory.
    ///
    /// The previous index is replaced in a single transaction once every
    /// file has been embedded.
    Ingest {
        /// Directory to ingest (overrides `ingest.data_dir`).
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Scan, extract and chunk only; no embedding calls or writes.
        #[arg(long)]
        dry_run: bool,

        /// Progress on stderr. Defaults to human on a TTY, otherwise off.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Show the chunks ranked for a query, with cosine scores.
    Search {
        query: String,

        /// Number of results (overrides `retrieval.top_k`).
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Answer a question using the indexed documents as context.
    Ask {
        query: String,

        /// JSON file with prior turns: `[{"role": "user", "content": "..."}]`.
        #[arg(long)]
        history: Option<PathBuf>,

        /// Number of chunks to ground on (overrides `retrieval.top_k`).
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Summarize the index: chunk counts, dimension, per-source breakdown.
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let unavailable = err
                .chain()
                .filter_map(|e| e.downcast_ref::<RagError>())
                .any(RagError::is_unavailable);
            if unavailable {
                eprintln!("Error: service not configured: {:#}", err);
                ExitCode::from(2)
            } else {
                eprintln!("Error: {:#}", err);
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let load = || config::load_config(&cli.config);

    match cli.command {
        Commands::Init => run_init(&cli.config).await?,
        Commands::Ingest {
            data_dir,
            dry_run,
            progress,
        } => {
            let mode = progress.unwrap_or_else(ProgressMode::default_for_tty);
            ingest::run_ingest(&load()?, data_dir, dry_run, mode).await?;
        }
        Commands::Search { query, top_k } => {
            search::run_search(&load()?, &query, top_k).await?;
        }
        Commands::Ask {
            query,
            history,
            top_k,
        } => {
            ask::run_ask(&load()?, &query, history.as_deref(), top_k).await?;
        }
        Commands::Stats => {
            stats::run_stats(&load()?).await?;
        }
    }

    Ok(())
}

async fn run_init(config_path: &std::path::Path) -> anyhow::Result<()> {
    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(config_path, config::default_config_toml()?)?;
        println!("Wrote default config to {}", config_path.display());
    }

    let cfg: Config = config::load_config(config_path)?;
    let pool = db::connect(&cfg).await?;
    migrate::run_migrations(&pool).await?;
    pool.close().await;

    println!("Database initialized at {}", cfg.db.path.display());
    Ok(())
}

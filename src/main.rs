mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use songvec::config::SongvecConfig;

#[derive(Parser)]
#[command(name = "songvec", version, about = "Find songs by mood, theme, or situation")]
struct Cli {
    /// Config file (default: ~/.songvec/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build (or load) the index, then answer queries
    Run {
        /// Lyrics CSV; rebuilt from when it exists
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Only embed the first N songs
        #[arg(long)]
        sample: Option<usize>,
        /// Results per query
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Query to answer; repeatable. Without any, queries are read from stdin.
        #[arg(short, long = "query")]
        queries: Vec<String>,
    },
    /// Embed a lyrics CSV and persist the index
    Build {
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Only embed the first N songs
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Search the persisted index
    Search {
        /// Free-text query, e.g. "nostalgia"
        query: String,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Show the persisted index and its build details
    Info,
    /// Manage the local embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.songvec/models/
    Download,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(songvec::config::default_config_path);
    let config = SongvecConfig::load_from(&config_path)?;

    // Log to stderr so stdout carries only results.
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if !config_path.exists() {
        tracing::info!("no config file at {}, using defaults", config_path.display());
    }

    match cli.command {
        Command::Run {
            dataset,
            sample,
            top_k,
            queries,
        } => cli::run::run(
            &config,
            cli::run::RunOptions {
                dataset,
                sample,
                top_k,
                queries,
            },
        ),
        Command::Build { dataset, limit } => cli::build::build(&config, dataset, limit),
        Command::Search { query, top_k } => cli::search::search(&config, &query, top_k),
        Command::Info => cli::info::info(&config),
        Command::Model { action } => match action {
            ModelAction::Download => {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()?;
                runtime.block_on(cli::model_download(&config.embedding))
            }
        },
    }
}

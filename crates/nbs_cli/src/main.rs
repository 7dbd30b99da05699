use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use nbs_scrapers::cli::{handle_command, ScraperCommands};
use nbs_scrapers::logging::init_logging;
use nbs_scrapers::ScraperArgs;
use nbs_storage::{create_storage, IngestMode, Storage, StorageConfig, StorageKind};
use nbs_web::AppState;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Storage backend
    #[arg(long, value_enum, default_value_t = StorageKind::Sqlite)]
    storage: StorageKind,
    /// SQLite database file
    #[arg(long, env = "NBS_DATABASE", default_value = "articles.db")]
    database: PathBuf,
    /// Default log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Crawl the press-release pages into the store
    Scrape {
        #[command(subcommand)]
        command: ScraperCommands,
    },
    /// Serve the read API over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: SocketAddr,
    },
    /// Inspect or delete stored articles
    Articles {
        #[command(subcommand)]
        command: ArticleCommands,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ArticleCommands {
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    Get {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

impl Cli {
    fn storage_config(&self) -> StorageConfig {
        let mode = match &self.command {
            Commands::Scrape {
                command: ScraperCommands::Crawl { upsert: true, .. },
            } => IngestMode::Upsert,
            _ => IngestMode::Reload,
        };
        StorageConfig {
            kind: self.storage,
            path: self.database.clone(),
            mode,
        }
    }
}

async fn run(command: Commands, storage: &Storage) -> anyhow::Result<()> {
    match command {
        Commands::Scrape { command } => {
            info!("🦗 Running scrape command");
            handle_command(ScraperArgs { command }, storage.sink.clone()).await?;
        }
        Commands::Serve { addr } => {
            let state = AppState {
                store: storage.store.clone(),
            };
            nbs_web::serve(addr, state).await?;
        }
        Commands::Articles { command } => match command {
            ArticleCommands::List { skip, limit } => {
                let articles = storage.store.list(skip, limit).await?;
                println!("{}", serde_json::to_string_pretty(&articles)?);
            }
            ArticleCommands::Get { id } => {
                let article = storage.store.get(id).await?;
                println!("{}", serde_json::to_string_pretty(&article)?);
            }
            ArticleCommands::Delete { id } => {
                storage.store.delete(id).await?;
                println!("Successfully deleted article with ID {}", id);
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = cli.storage_config();
    let storage = create_storage(&config)
        .await
        .with_context(|| format!("opening {:?} storage", config.kind))?;
    info!("💾 Storage ready ({:?}, {:?})", config.kind, config.mode);

    let result = run(cli.command, &storage).await;
    storage.close().await;
    result
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Subcommand};
use nbs_core::{ArticleSink, CrawlConfig, Error, Result};

use crate::manager::ScraperManager;

#[derive(Args, Debug, Clone)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScraperCommands {
    /// Reset the store and ingest every configured page
    Crawl {
        /// JSON crawl configuration (urls, concurrency, timeout_secs, rules)
        #[arg(long, env = "NBS_CRAWL_CONFIG")]
        config: Option<PathBuf>,
        /// Override the number of pages fetched at once
        #[arg(long)]
        concurrency: Option<usize>,
        /// Update rows with the same link instead of dropping the table first
        #[arg(long)]
        upsert: bool,
    },
    /// List the pages a crawl would fetch
    List {
        #[arg(long, env = "NBS_CRAWL_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Fetch and extract a single page without storing it
    Url {
        url: String,
        #[arg(long, env = "NBS_CRAWL_CONFIG")]
        config: Option<PathBuf>,
    },
}

pub fn load_config(path: Option<&Path>, concurrency: Option<usize>) -> Result<CrawlConfig> {
    let mut config = match path {
        Some(path) => CrawlConfig::from_file(path)?,
        None => CrawlConfig::default(),
    };
    if let Some(concurrency) = concurrency {
        config.concurrency = concurrency;
    }
    config.validate()?;
    Ok(config)
}

pub async fn handle_command(args: ScraperArgs, sink: Arc<dyn ArticleSink>) -> Result<()> {
    match args.command {
        ScraperCommands::Crawl {
            config,
            concurrency,
            // Picked up by whoever opens the sink.
            upsert: _,
        } => {
            let config = load_config(config.as_deref(), concurrency)?;
            let manager = ScraperManager::with_default_scrapers(sink, config)?;
            let report = manager.crawl().await?;

            for stored in &report.stored {
                println!("🆕 #{} {}", stored.id, stored.url);
            }
            for failure in &report.failures {
                eprintln!("❌ {} - {}", failure.url, failure.error);
            }
            println!("{}", report);

            if !report.is_success() {
                return Err(Error::Scraping(format!(
                    "{} of {} pages were not stored",
                    report.failed(),
                    report.failed() + report.succeeded()
                )));
            }
        }
        ScraperCommands::List { config } => {
            let config = load_config(config.as_deref(), None)?;
            let manager = ScraperManager::with_default_scrapers(sink, config)?;
            for scraper in manager.scrapers() {
                let meta = scraper.source_metadata();
                println!(
                    "{} {} ({}/{})",
                    meta.emoji,
                    meta.name,
                    meta.region.name,
                    scraper.cli_names().join(",")
                );
            }
            for url in manager.urls() {
                println!("  {}", url);
            }
        }
        ScraperCommands::Url { url, config } => {
            let config = load_config(config.as_deref(), None)?;
            let manager = ScraperManager::with_default_scrapers(sink, config)?;
            let record = manager.scrape_url(&url).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }
    Ok(())
}

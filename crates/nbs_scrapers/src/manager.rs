use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use nbs_core::{ArticleId, ArticleRecord, ArticleSink, CrawlConfig, Error, Result};
use reqwest::Client;
use scraper::Html;
use tracing::{debug, error, info, instrument};

use crate::scrapers::{default_scrapers, BoxedScraper, Scraper};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArticle {
    pub url: String,
    pub id: ArticleId,
}

#[derive(Debug)]
pub struct CrawlFailure {
    pub url: String,
    pub error: Error,
}

/// Outcome of one ingestion run: every URL ends up in exactly one list.
#[derive(Debug)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stored: Vec<StoredArticle>,
    pub failures: Vec<CrawlFailure>,
}

impl CrawlReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            stored: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.stored.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = self.finished_at - self.started_at;
        write!(
            f,
            "{} succeeded, {} failed in {}.{:03}s",
            self.succeeded(),
            self.failed(),
            elapsed.num_seconds(),
            elapsed.num_milliseconds() % 1000
        )
    }
}

/// Drives fetch → extract → store for a fixed list of pages.
pub struct ScraperManager {
    sink: Arc<dyn ArticleSink>,
    scrapers: Vec<BoxedScraper>,
    client: Client,
    config: CrawlConfig,
}

impl ScraperManager {
    pub fn new(sink: Arc<dyn ArticleSink>, config: CrawlConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            sink,
            scrapers: Vec::new(),
            client,
            config,
        })
    }

    /// A manager with every shipped scraper, built from `config.rules`.
    pub fn with_default_scrapers(sink: Arc<dyn ArticleSink>, config: CrawlConfig) -> Result<Self> {
        let mut manager = Self::new(sink, config)?;
        for scraper in default_scrapers(&manager.config.rules)? {
            manager.add_scraper(scraper);
        }
        Ok(manager)
    }

    pub fn add_scraper(&mut self, scraper: BoxedScraper) {
        self.scrapers.push(scraper);
    }

    pub fn scrapers(&self) -> &[BoxedScraper] {
        &self.scrapers
    }

    /// The configured URLs, or every scraper's start URLs when none are set.
    pub fn urls(&self) -> Vec<String> {
        if !self.config.urls.is_empty() {
            return self.config.urls.clone();
        }
        self.scrapers.iter().flat_map(|s| s.start_urls()).collect()
    }

    pub fn get_scraper_for_url(&self, url: &str) -> Result<&dyn Scraper> {
        self.scrapers
            .iter()
            .find(|s| s.can_handle(url))
            .map(|s| &**s)
            .ok_or_else(|| Error::Scraping(format!("No scraper found for URL: {}", url)))
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|source| Error::Fetch {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| Error::Fetch {
            url: url.to_string(),
            source,
        })
    }

    /// Fetches and extracts one page without storing it.
    #[instrument(skip(self), level = "debug")]
    pub async fn scrape_url(&self, url: &str) -> Result<ArticleRecord> {
        let scraper = self.get_scraper_for_url(url)?;
        let html = self.fetch_page(url).await?;
        debug!(bytes = html.len(), "Fetched page");
        Ok(extract_record(scraper, &html, url))
    }

    /// Resets the sink, then ingests every URL. Per-URL failures end up in
    /// the report; only a failed reset aborts the run.
    #[instrument(skip(self))]
    pub async fn crawl(&self) -> Result<CrawlReport> {
        let mut report = CrawlReport::new(Utc::now());
        self.sink.initialize().await?;

        let urls = self.urls();
        info!(count = urls.len(), concurrency = self.config.concurrency, "Starting crawl");

        let mut pages = stream::iter(urls)
            .map(|url| async move {
                let result = self.scrape_url(&url).await;
                (url, result)
            })
            .buffer_unordered(self.config.concurrency);

        // Single writer: records are stored one at a time as pages complete.
        while let Some((url, result)) = pages.next().await {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    error!(%url, error = %e, "Failed to scrape page");
                    report.failures.push(CrawlFailure { url, error: e });
                    continue;
                }
            };

            match self.sink.store(&record).await {
                Ok(id) => {
                    info!(%url, id, title = %record.name, "Stored article");
                    report.stored.push(StoredArticle { url, id });
                }
                Err(e) => {
                    error!(%url, error = %e, "Failed to store article");
                    report.failures.push(CrawlFailure { url, error: e });
                }
            }
        }

        report.finished_at = Utc::now();
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Crawl finished"
        );
        Ok(report)
    }
}

fn extract_record(scraper: &dyn Scraper, html: &str, url: &str) -> ArticleRecord {
    let document = Html::parse_document(html);
    scraper.extract(&document, url)
}

pub mod cli;
pub mod logging;
pub mod manager;
pub mod sanitize;
pub mod scrapers;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use manager::{CrawlFailure, CrawlReport, ScraperManager, StoredArticle};
pub use scrapers::Scraper;

pub mod prelude {
    pub use super::scrapers::Scraper;
    pub use super::ScraperManager;
    pub use nbs_core::{ArticleRecord, Error, Result};
}

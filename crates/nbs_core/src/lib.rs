pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use config::{CrawlConfig, SiteRules};
pub use error::Error;
pub use storage::{ArticleSink, ArticleStore};
pub use types::{Article, ArticleId, ArticleRecord};

pub type Result<T> = std::result::Result<T, Error>;

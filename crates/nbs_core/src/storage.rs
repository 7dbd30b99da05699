use async_trait::async_trait;
use crate::types::{Article, ArticleId, ArticleRecord};
use crate::Result;

/// Write side of the store. The sink is the only component allowed to
/// assign identifiers.
#[async_trait]
pub trait ArticleSink: Send + Sync {
    /// (Re)create the backing table. Safe to call repeatedly.
    async fn initialize(&self) -> Result<()>;

    /// Persist one record and return the identifier it was given.
    async fn store(&self, record: &ArticleRecord) -> Result<ArticleId>;

    /// Release any held connections. Later calls may fail.
    async fn close(&self) {}
}

/// Read/delete side of the store, consumed by the web API and the CLI.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Articles ordered by id, skipping `skip` rows.
    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Article>>;

    /// Fails with [`crate::Error::NotFound`] when the id is unknown.
    async fn get(&self, id: ArticleId) -> Result<Article>;

    /// Fails with [`crate::Error::NotFound`] when nothing was deleted.
    async fn delete(&self, id: ArticleId) -> Result<()>;
}

use async_trait::async_trait;
use nbs_core::{Article, ArticleId, ArticleRecord, ArticleSink, ArticleStore, Error, Result};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::IngestMode;

struct MemoryStore {
    // Only ever grows, mirroring SQLite's AUTOINCREMENT sequence.
    next_id: ArticleId,
    articles: BTreeMap<ArticleId, ArticleRecord>,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            next_id: 1,
            articles: BTreeMap::new(),
        }
    }

    fn insert(&mut self, record: &ArticleRecord) -> ArticleId {
        let id = self.next_id;
        self.next_id += 1;
        self.articles.insert(id, record.clone());
        id
    }

    fn upsert(&mut self, record: &ArticleRecord) -> ArticleId {
        if let Some((id, stored)) = self
            .articles
            .iter_mut()
            .find(|(_, stored)| stored.link == record.link)
        {
            *stored = record.clone();
            return *id;
        }
        self.insert(record)
    }
}

/// Process-local backend, used for tests and dry runs.
pub struct InMemoryStorage {
    store: RwLock<MemoryStore>,
    mode: IngestMode,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::with_mode(IngestMode::Reload)
    }

    pub fn with_mode(mode: IngestMode) -> Self {
        Self {
            store: RwLock::new(MemoryStore::new()),
            mode,
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleSink for InMemoryStorage {
    async fn initialize(&self) -> Result<()> {
        if self.mode == IngestMode::Reload {
            *self.store.write().await = MemoryStore::new();
        }
        Ok(())
    }

    async fn store(&self, record: &ArticleRecord) -> Result<ArticleId> {
        let mut store = self.store.write().await;
        Ok(match self.mode {
            IngestMode::Reload => store.insert(record),
            IngestMode::Upsert => store.upsert(record),
        })
    }
}

#[async_trait]
impl ArticleStore for InMemoryStorage {
    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store
            .articles
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|(id, record)| Article::from_record(*id, record.clone()))
            .collect())
    }

    async fn get(&self, id: ArticleId) -> Result<Article> {
        let store = self.store.read().await;
        store
            .articles
            .get(&id)
            .map(|record| Article::from_record(id, record.clone()))
            .ok_or(Error::NotFound(id))
    }

    async fn delete(&self, id: ArticleId) -> Result<()> {
        let mut store = self.store.write().await;
        store
            .articles
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::NotFound(id))
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;
use nbs_core::{ArticleSink, ArticleStore, Result};
use serde::{Deserialize, Serialize};

pub mod backends;

pub use backends::*;

/// What `initialize` and `store` do with rows from earlier runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Drop and recreate the table on every run; ids restart.
    #[default]
    Reload,
    /// Keep the table and update rows in place, keyed by link.
    Upsert,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub kind: StorageKind,
    pub path: PathBuf,
    pub mode: IngestMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::Sqlite,
            path: PathBuf::from("articles.db"),
            mode: IngestMode::Reload,
        }
    }
}

/// One backend seen through both of its roles.
#[derive(Clone)]
pub struct Storage {
    pub sink: Arc<dyn ArticleSink>,
    pub store: Arc<dyn ArticleStore>,
}

impl Storage {
    pub fn from_backend<T>(backend: Arc<T>) -> Self
    where
        T: ArticleSink + ArticleStore + 'static,
    {
        Self {
            sink: backend.clone(),
            store: backend,
        }
    }

    /// Releases the backend's connections.
    pub async fn close(&self) {
        self.sink.close().await;
    }
}

pub async fn create_storage(config: &StorageConfig) -> Result<Storage> {
    let storage = match config.kind {
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite => {
            let backend = SQLiteStorage::new_with_path(&config.path, config.mode).await?;
            tracing::info!(path = %config.path.display(), mode = ?config.mode, "Opened SQLite storage");
            Storage::from_backend(Arc::new(backend))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageKind::Sqlite => {
            return Err(nbs_core::Error::Config(
                "built without the sqlite feature".to_string(),
            ))
        }
        StorageKind::Memory => {
            tracing::info!(mode = ?config.mode, "Using in-memory storage");
            Storage::from_backend(Arc::new(InMemoryStorage::with_mode(config.mode)))
        }
    };
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, IngestMode, Storage, StorageConfig, StorageKind};
}

use async_trait::async_trait;
use nbs_core::{Article, ArticleId, ArticleRecord, ArticleSink, ArticleStore, Error, Result};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::IngestMode;

const DROP_TABLE: &str = "DROP TABLE IF EXISTS scrapped_articles";

// AUTOINCREMENT keeps deleted ids from being handed out again.
const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS scrapped_articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT,
        name TEXT,
        link TEXT,
        labels TEXT,
        content TEXT
    )
"#;

const CREATE_LINK_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_scrapped_articles_link ON scrapped_articles (link)";

const INSERT_ARTICLE: &str = r#"
    INSERT INTO scrapped_articles (date, name, link, labels, content)
    VALUES (?, ?, ?, ?, ?)
"#;

const SELECT_COLUMNS: &str = "SELECT id, date, name, link, labels, content FROM scrapped_articles";

fn db_error(context: &str, e: sqlx::Error) -> Error {
    Error::Storage(format!("{}: {}", context, e))
}

pub struct SQLiteStorage {
    pool: SqlitePool,
    db_path: Option<PathBuf>,
    mode: IngestMode,
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path, mode: IngestMode) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| db_error("Failed to connect to database", e))?;

        Ok(Self {
            pool,
            db_path: Some(db_path.to_path_buf()),
            mode,
        })
    }

    /// A private database that lives as long as this value. The pool is
    /// pinned to one connection since every SQLite memory connection is a
    /// separate database.
    pub async fn new_in_memory(mode: IngestMode) -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| db_error("Invalid connection string", e))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .map_err(|e| db_error("Failed to open in-memory database", e))?;

        Ok(Self {
            pool,
            db_path: None,
            mode,
        })
    }

    pub fn get_db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert(conn: &mut SqliteConnection, record: &ArticleRecord) -> Result<ArticleId> {
        let result = sqlx::query(INSERT_ARTICLE)
            .bind(&record.date)
            .bind(&record.name)
            .bind(&record.link)
            .bind(&record.labels)
            .bind(&record.content)
            .execute(conn)
            .await
            .map_err(|e| db_error("Failed to store article", e))?;
        Ok(result.last_insert_rowid())
    }

    async fn upsert(&self, record: &ArticleRecord) -> Result<ArticleId> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let existing: Option<ArticleId> = sqlx::query_scalar(
            "SELECT id FROM scrapped_articles WHERE link = ? ORDER BY id LIMIT 1",
        )
        .bind(&record.link)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to look up article by link", e))?;

        let id = match existing {
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE scrapped_articles
                    SET date = ?, name = ?, labels = ?, content = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&record.date)
                .bind(&record.name)
                .bind(&record.labels)
                .bind(&record.content)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to update article", e))?;
                id
            }
            None => Self::insert(&mut *tx, record).await?,
        };

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit article", e))?;
        Ok(id)
    }
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    let text = |column: &str| -> Result<String> {
        row.try_get::<Option<String>, _>(column)
            .map(Option::unwrap_or_default)
            .map_err(|e| db_error("Failed to decode article", e))
    };

    Ok(Article {
        id: row
            .try_get("id")
            .map_err(|e| db_error("Failed to decode article", e))?,
        date: text("date")?,
        name: text("name")?,
        link: text("link")?,
        labels: text("labels")?,
        content: text("content")?,
    })
}

#[async_trait]
impl ArticleSink for SQLiteStorage {
    async fn initialize(&self) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        if self.mode == IngestMode::Reload {
            sqlx::query(DROP_TABLE)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to drop table", e))?;
        }
        for statement in [CREATE_TABLE, CREATE_LINK_INDEX] {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to create table", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit schema", e))?;
        tracing::debug!(mode = ?self.mode, "Initialized scrapped_articles");
        Ok(())
    }

    async fn store(&self, record: &ArticleRecord) -> Result<ArticleId> {
        match self.mode {
            IngestMode::Reload => {
                let mut conn = self
                    .pool
                    .acquire()
                    .await
                    .map_err(|e| db_error("Failed to acquire connection", e))?;
                Self::insert(&mut *conn, record).await
            }
            IngestMode::Upsert => self.upsert(record).await,
        }
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ArticleStore for SQLiteStorage {
    async fn list(&self, skip: u32, limit: u32) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!("{} ORDER BY id LIMIT ? OFFSET ?", SELECT_COLUMNS))
            .bind(i64::from(limit))
            .bind(i64::from(skip))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list articles", e))?;

        rows.iter().map(article_from_row).collect()
    }

    async fn get(&self, id: ArticleId) -> Result<Article> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to get article", e))?;

        match row {
            Some(row) => article_from_row(&row),
            None => Err(Error::NotFound(id)),
        }
    }

    async fn delete(&self, id: ArticleId) -> Result<()> {
        let result = sqlx::query("DELETE FROM scrapped_articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete article", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(link: &str, content: &str) -> ArticleRecord {
        ArticleRecord {
            date: "14.1.2010".to_string(),
            name: "Statement from the 27th meeting".to_string(),
            link: link.to_string(),
            labels: "Press release".to_string(),
            content: content.to_string(),
        }
    }

    async fn reload_storage() -> SQLiteStorage {
        let storage = SQLiteStorage::new_in_memory(IngestMode::Reload).await.unwrap();
        storage.initialize().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_initialize_twice_leaves_empty_table() {
        let storage = reload_storage().await;
        storage.store(&record("https://nbs.sk/a/", "A")).await.unwrap();

        storage.initialize().await.unwrap();
        assert!(storage.list(0, 100).await.unwrap().is_empty());
        storage.initialize().await.unwrap();
        assert!(storage.list(0, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_increase_and_are_never_reused() {
        let storage = reload_storage().await;
        let r1 = storage.store(&record("https://nbs.sk/1/", "1")).await.unwrap();
        let r2 = storage.store(&record("https://nbs.sk/2/", "2")).await.unwrap();
        let r3 = storage.store(&record("https://nbs.sk/3/", "3")).await.unwrap();
        assert!(r1 < r2 && r2 < r3);

        storage.delete(r2).await.unwrap();
        let r4 = storage.store(&record("https://nbs.sk/4/", "4")).await.unwrap();
        assert!(r4 > r3);

        // Deleting the highest id must not free it either.
        storage.delete(r4).await.unwrap();
        let r5 = storage.store(&record("https://nbs.sk/5/", "5")).await.unwrap();
        assert!(r5 > r4);
    }

    #[tokio::test]
    async fn test_store_then_get_round_trips() {
        let storage = reload_storage().await;
        let input = record("https://nbs.sk/en/news/a/", "Intro text.");
        let id = storage.store(&input).await.unwrap();

        let article = storage.get(id).await.unwrap();
        assert_eq!(article.id, id);
        assert_eq!(article.record(), input);
    }

    #[tokio::test]
    async fn test_values_are_bound_not_interpolated() {
        let storage = reload_storage().await;
        let hostile = ArticleRecord {
            date: "\"); DROP TABLE scrapped_articles; --".to_string(),
            name: "It's \"quoted\"".to_string(),
            link: "https://nbs.sk/'".to_string(),
            labels: "'; DELETE FROM scrapped_articles; --".to_string(),
            content: "Robert'); --".to_string(),
        };
        let id = storage.store(&hostile).await.unwrap();

        assert_eq!(storage.get(id).await.unwrap().record(), hostile);
        assert_eq!(storage.list(0, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let storage = reload_storage().await;
        let id = storage.store(&record("https://nbs.sk/a/", "A")).await.unwrap();

        storage.delete(id).await.unwrap();
        assert!(matches!(storage.get(id).await, Err(Error::NotFound(missing)) if missing == id));
        assert!(matches!(storage.delete(id).await, Err(Error::NotFound(_))));
        assert!(matches!(storage.get(9999).await, Err(Error::NotFound(9999))));
    }

    #[tokio::test]
    async fn test_list_pages_by_offset() {
        let storage = reload_storage().await;
        let mut ids = Vec::new();
        for i in 0..5 {
            let link = format!("https://nbs.sk/{}/", i);
            ids.push(storage.store(&record(&link, "x")).await.unwrap());
        }

        let page = storage.list(1, 2).await.unwrap();
        assert_eq!(page.iter().map(|a| a.id).collect::<Vec<_>>(), ids[1..3].to_vec());
        assert_eq!(storage.list(4, 100).await.unwrap().len(), 1);
        assert!(storage.list(10, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_null_columns_read_as_empty() {
        let storage = reload_storage().await;
        sqlx::query("INSERT INTO scrapped_articles (link) VALUES (?)")
            .bind("https://nbs.sk/null/")
            .execute(storage.pool())
            .await
            .unwrap();

        let articles = storage.list(0, 10).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].date, "");
        assert_eq!(articles[0].content, "");
        assert_eq!(articles[0].link, "https://nbs.sk/null/");
    }

    #[tokio::test]
    async fn test_upsert_updates_in_place() {
        let storage = SQLiteStorage::new_in_memory(IngestMode::Upsert).await.unwrap();
        storage.initialize().await.unwrap();

        let first = storage.store(&record("https://nbs.sk/a/", "old")).await.unwrap();
        let other = storage.store(&record("https://nbs.sk/b/", "b")).await.unwrap();
        let again = storage.store(&record("https://nbs.sk/a/", "new")).await.unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(storage.get(first).await.unwrap().content, "new");
        assert_eq!(storage.list(0, 10).await.unwrap().len(), 2);

        // Upsert mode keeps rows across initialize.
        storage.initialize().await.unwrap();
        assert_eq!(storage.list(0, 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_file_database_reload_and_upsert() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("articles.db");

        let storage = SQLiteStorage::new_with_path(&db_path, IngestMode::Upsert).await.unwrap();
        storage.initialize().await.unwrap();
        storage.store(&record("https://nbs.sk/a/", "A")).await.unwrap();
        storage.close().await;

        let storage = SQLiteStorage::new_with_path(&db_path, IngestMode::Upsert).await.unwrap();
        storage.initialize().await.unwrap();
        assert_eq!(storage.list(0, 10).await.unwrap().len(), 1);
        storage.close().await;

        let storage = SQLiteStorage::new_with_path(&db_path, IngestMode::Reload).await.unwrap();
        assert_eq!(storage.get_db_path(), Some(db_path.as_path()));
        storage.initialize().await.unwrap();
        assert!(storage.list(0, 10).await.unwrap().is_empty());
        storage.close().await;
    }
}

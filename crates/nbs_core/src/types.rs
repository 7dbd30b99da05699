use serde::{Deserialize, Serialize};

/// Identifier assigned by the sink when a record is first stored.
pub type ArticleId = i64;

/// An extracted article that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub date: String,
    pub name: String,
    pub link: String,
    pub labels: String,
    pub content: String,
}

/// A stored article, as read back through the facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub date: String,
    pub name: String,
    pub link: String,
    pub labels: String,
    pub content: String,
}

impl Article {
    pub fn from_record(id: ArticleId, record: ArticleRecord) -> Self {
        Self {
            id,
            date: record.date,
            name: record.name,
            link: record.link,
            labels: record.labels,
            content: record.content,
        }
    }

    /// Drops the identifier, leaving the five extracted fields.
    pub fn record(&self) -> ArticleRecord {
        ArticleRecord {
            date: self.date.clone(),
            name: self.name.clone(),
            link: self.link.clone(),
            labels: self.labels.clone(),
            content: self.content.clone(),
        }
    }
}

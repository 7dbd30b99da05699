use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nbs_core::{Article, ArticleId, Error};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppState;

const DEFAULT_LIMIT: u32 = 100;

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Maps store errors onto HTTP responses.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = if self.0.is_not_found() {
            (StatusCode::NOT_FOUND, "Article not found".to_string())
        } else {
            tracing::error!(error = %self.0, "Article API request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string())
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let articles = state.store.list(pagination.skip, pagination.limit).await?;
    Ok(Json(articles))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ArticleId>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.store.get(id).await?))
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ArticleId>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete(id).await?;
    Ok(Json(json!({
        "detail": format!("Successfully deleted article with ID {}", id)
    })))
}

#[cfg(test)]
mod tests {
    use crate::{create_app, AppState};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use nbs_core::{ArticleRecord, ArticleSink};
    use nbs_storage::InMemoryStorage;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app_with(count: usize) -> (Router, Vec<i64>) {
        let storage = Arc::new(InMemoryStorage::new());
        let mut ids = Vec::new();
        for i in 0..count {
            let record = ArticleRecord {
                name: format!("Article {}", i),
                link: format!("https://nbs.sk/en/news/{}/", i),
                ..ArticleRecord::default()
            };
            ids.push(storage.store(&record).await.unwrap());
        }
        (create_app(AppState { store: storage }), ids)
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_list_articles_pages() {
        let (app, ids) = app_with(3).await;

        let (status, body) = send(app.clone(), Method::GET, "/items").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (_, body) = send(app, Method::GET, "/items?skip=1&limit=1").await;
        let page = body.as_array().unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0]["id"], ids[1]);
        assert_eq!(page[0]["name"], "Article 1");
    }

    #[tokio::test]
    async fn test_list_articles_with_trailing_slash() {
        let (app, _) = app_with(2).await;

        let (status, body) = send(app, Method::GET, "/items/?limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_article() {
        let (app, ids) = app_with(1).await;

        let (status, body) = send(app.clone(), Method::GET, &format!("/item/{}", ids[0])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["link"], "https://nbs.sk/en/news/0/");

        let (status, body) = send(app, Method::GET, "/item/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Article not found");
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let (app, ids) = app_with(1).await;
        let uri = format!("/item/{}", ids[0]);

        let (status, body) = send(app.clone(), Method::DELETE, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["detail"].as_str().unwrap().contains(&ids[0].to_string()));

        let (status, _) = send(app.clone(), Method::GET, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(app, Method::DELETE, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

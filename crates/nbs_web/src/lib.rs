use axum::{routing::get, Router};
use nbs_core::{Error, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/items", get(handlers::list_articles))
        .route("/items/", get(handlers::list_articles))
        .route(
            "/item/:id",
            get(handlers::get_article).delete(handlers::delete_article),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Serves the read API until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Serving article API");
    axum::serve(listener, create_app(state))
        .await
        .map_err(Error::Io)
}

pub mod prelude {
    pub use nbs_core::{Article, Error, Result};
    pub use crate::AppState;
}

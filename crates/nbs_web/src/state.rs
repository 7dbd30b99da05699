use std::sync::Arc;
use nbs_core::ArticleStore;

pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
}

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::warn;

use crate::collection::PostCollection;
use crate::config::Config;
use crate::content_loader::{load_collection, Origin};
use crate::error::Result;

pub type RefreshBroadcaster = broadcast::Sender<()>;

pub struct AppState {
    pub config: Config,
    /// Built once from `config`; remote origins share one HTTP client.
    pub origin: Origin,
    pub layout_html: RwLock<String>, // supports {{ title }}, {{ meta }}, {{ content }}
    /// Last good load. `None` after a failed load; the next request retries.
    pub posts: RwLock<Option<Arc<PostCollection>>>,
}

impl AppState {
    pub fn new(config: Config, layout_html: String, posts: Option<PostCollection>) -> Self {
        AppState {
            origin: config.origin(),
            config,
            layout_html: RwLock::new(layout_html),
            posts: RwLock::new(posts.map(Arc::new)),
        }
    }

    /// The cached collection, loading it first if the cache is empty.
    pub async fn collection(&self) -> Result<Arc<PostCollection>> {
        if let Some(posts) = &*self.posts.read().await {
            return Ok(posts.clone());
        }

        let mut cached = self.posts.write().await;
        if let Some(posts) = &*cached {
            return Ok(posts.clone());
        }
        match load_collection(&self.config, &self.origin).await {
            Ok(collection) => {
                let collection = Arc::new(collection);
                *cached = Some(collection.clone());
                Ok(collection)
            }
            Err(e) => {
                warn!("Failed to load posts: {}", e);
                Err(e)
            }
        }
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub app_state: Arc<AppState>,
    pub broadcaster: RefreshBroadcaster,
}

impl axum::extract::FromRef<RouterState> for Arc<AppState> {
    fn from_ref(state: &RouterState) -> Self {
        state.app_state.clone()
    }
}

impl axum::extract::FromRef<RouterState> for RefreshBroadcaster {
    fn from_ref(state: &RouterState) -> Self {
        state.broadcaster.clone()
    }
}

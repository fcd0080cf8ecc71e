use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::{net::TcpListener, sync::broadcast};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};

use crate::collection::Category;
use crate::config::Config;
use crate::content_loader::{load_layout, load_post};
use crate::error::BlogError;
use crate::hot_reload::{start_content_watcher, ws_handler};
use crate::models::{ParsedPost, Post};
use crate::render::{
    post_page_title, render_index, render_load_error, render_not_found, render_post,
    render_post_meta, render_with_layout,
};
use crate::state::{AppState, RefreshBroadcaster, RouterState};

#[derive(Deserialize, Debug, Default)]
pub struct IndexQuery {
    pub category: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PostQuery {
    pub slug: Option<String>,
}

async fn page(state: &AppState, title: &str, meta: &str, content: &str) -> String {
    let layout = state.layout_html.read().await;
    render_with_layout(&layout, title, meta, content, state.config.is_development)
}

async fn index(
    Query(query): Query<IndexQuery>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Html<String>) {
    let category = Category::from_query(query.category.as_deref());
    let (status, body) = match state.collection().await {
        Ok(collection) => (StatusCode::OK, render_index(&collection, &category)),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, render_load_error()),
    };
    let title = state.config.site_title.clone();
    (status, Html(page(&state, &title, "", &body).await))
}

async fn cached_post(state: &AppState, slug: &str) -> Option<ParsedPost> {
    let posts = state.posts.read().await;
    match (*posts).as_ref()?.find(slug)? {
        Post::Parsed(post) => Some(post.clone()),
        Post::Manifest(_) => None,
    }
}

async fn render_detail(state: &AppState, slug: &str) -> (StatusCode, Html<String>) {
    let post = match cached_post(state, slug).await {
        Some(post) => Ok(post),
        None => load_post(&state.origin, slug, state.config.link_style).await,
    };

    match post {
        Ok(post) => {
            let title = post_page_title(&post, &state.config.site_title);
            let body = page(state, &title, &render_post_meta(&post), &render_post(&post)).await;
            (StatusCode::OK, Html(body))
        }
        Err(e) => {
            let status = match e {
                BlogError::NotFound { .. } => {
                    warn!("{}", e);
                    StatusCode::NOT_FOUND
                }
                _ => {
                    error!("Error loading post {}: {}", slug, e);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            let title = format!("Post Not Found | {}", state.config.site_title);
            (status, Html(page(state, &title, "", &render_not_found()).await))
        }
    }
}

/// `/post.html?slug=<slug>`; no slug goes back to the index.
async fn post_by_query(
    Query(query): Query<PostQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match query.slug.as_deref().filter(|slug| !slug.is_empty()) {
        Some(slug) => render_detail(&state, slug).await.into_response(),
        None => Redirect::to("/").into_response(),
    }
}

/// `/posts/<slug>.html`.
async fn post_by_path(
    Path(file): Path<String>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Html<String>) {
    let slug = file.strip_suffix(".html").unwrap_or_default();
    render_detail(&state, slug).await
}

async fn manifest(State(state): State<Arc<AppState>>) -> Response {
    match state.collection().await {
        Ok(collection) => Json(collection.manifest()).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub fn router(state: Arc<AppState>, broadcaster: RefreshBroadcaster) -> Router {
    let static_dir = state.config.static_dir();
    let favicon_ico = ServeFile::new(static_dir.join("favicon.ico"));

    Router::new()
        .route("/", get(index))
        .route("/index.html", get(index))
        .route("/post.html", get(post_by_query))
        .route("/posts/manifest.json", get(manifest))
        .route("/posts/{file}", get(post_by_path))
        .nest_service("/static", ServeDir::new(static_dir))
        .route_service("/favicon.ico", favicon_ico)
        .route("/ws", get(ws_handler))
        .with_state(RouterState {
            app_state: state,
            broadcaster,
        })
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("RUST_ENV is set to development: {}", config.is_development);

    let layout_html = load_layout(&config.layout_path()).await?;
    let port = config.port;
    let is_development = config.is_development;
    let state = Arc::new(AppState::new(config, layout_html, None));
    if let Err(e) = state.collection().await {
        warn!("Initial post load failed, will retry on first request: {}", e);
    }

    let (tx, _rx) = broadcast::channel(1);
    if is_development {
        info!("Hot reload enabled. Check logs for file change events.");
        start_content_watcher(tx.clone(), state.clone());
    }

    let app = router(state, tx);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

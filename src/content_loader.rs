use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use reqwest::StatusCode;
use tokio::fs;
use tracing::{debug, error, info};

use crate::collection::PostCollection;
use crate::config::{Config, SourceKind};
use crate::error::{BlogError, Result};
use crate::frontmatter::parse_post;
use crate::models::{LinkStyle, ManifestPost, ParsedPost};
use crate::state::AppState;

const MANIFEST_FILE: &str = "manifest.json";
const DEFAULT_LAYOUT: &str = include_str!("../content/templates/layout.html");

/// Where post sources live.
#[derive(Debug, Clone)]
pub enum Origin {
    Local(PathBuf),
    Remote {
        base_url: String,
        client: reqwest::Client,
    },
}

impl Origin {
    pub fn remote(base_url: &str) -> Self {
        Origin::Remote {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn location(&self, name: &str) -> String {
        match self {
            Origin::Local(dir) => dir.join(name).display().to_string(),
            Origin::Remote { base_url, .. } => format!("{}/{}", base_url, name),
        }
    }

    /// Fetches one source. `Ok(None)` means it does not exist.
    pub async fn fetch_text(&self, name: &str) -> Result<Option<String>> {
        let location = self.location(name);
        debug!("Fetching {}", location);
        match self {
            Origin::Local(dir) => match fs::read_to_string(dir.join(name)).await {
                Ok(text) => Ok(Some(text)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(BlogError::fetch(location, e)),
            },
            Origin::Remote { client, .. } => {
                let response = client
                    .get(&location)
                    .send()
                    .await
                    .map_err(|e| BlogError::fetch(&location, e))?;
                match response.status() {
                    StatusCode::NOT_FOUND => Ok(None),
                    status if !status.is_success() => Err(BlogError::fetch(location, status)),
                    _ => response
                        .text()
                        .await
                        .map(Some)
                        .map_err(|e| BlogError::fetch(location, e)),
                }
            }
        }
    }

    async fn fetch_required(&self, name: &str) -> Result<String> {
        self.fetch_text(name)
            .await?
            .ok_or_else(|| BlogError::fetch(self.location(name), "not found"))
    }

    /// Markdown file names to load: the configured list, or every `.md` in
    /// a local directory sorted by name.
    pub async fn markdown_files(&self, files: Option<&[String]>) -> Result<Vec<String>> {
        if let Some(files) = files {
            return Ok(files.to_vec());
        }
        match self {
            Origin::Local(dir) => list_markdown_files(dir).await,
            Origin::Remote { base_url, .. } => Err(BlogError::fetch(
                base_url.as_str(),
                "remote markdown sources need an explicit `files` list",
            )),
        }
    }
}

pub async fn list_markdown_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| BlogError::fetch(dir.display().to_string(), e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

async fn load_markdown(origin: &Origin, name: &str, link_style: LinkStyle) -> Result<ParsedPost> {
    let text = origin.fetch_required(name).await?;
    parse_post(&text, name, link_style)
}

/// Loads every post from `origin`. Any failing source fails the whole load.
pub async fn load_collection(config: &Config, origin: &Origin) -> Result<PostCollection> {
    match config.source {
        SourceKind::Markdown => {
            let files = origin.markdown_files(config.files.as_deref()).await?;
            let posts = try_join_all(
                files
                    .iter()
                    .map(|name| load_markdown(origin, name, config.link_style)),
            )
            .await?;
            info!("Loaded {} markdown posts", posts.len());
            Ok(PostCollection::from_parsed(posts))
        }
        SourceKind::Manifest => {
            let raw = origin.fetch_required(MANIFEST_FILE).await?;
            let mut entries: Vec<ManifestPost> = serde_json::from_str(&raw)?;
            for entry in &mut entries {
                if entry.meta.url.is_none() {
                    entry.meta.url = Some(config.link_style.post_url(&entry.meta.slug));
                }
            }
            info!("Loaded {} manifest entries", entries.len());
            Ok(PostCollection::from_manifest(entries))
        }
    }
}

/// A slug names a single file; anything that could walk out of the posts
/// directory is treated as unknown.
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains(['/', '\\'])
        && !slug.contains("..")
}

/// Fetches and parses `<slug>.md` for the detail view.
pub async fn load_post(origin: &Origin, slug: &str, link_style: LinkStyle) -> Result<ParsedPost> {
    let not_found = || BlogError::NotFound {
        slug: slug.to_string(),
    };
    if !is_valid_slug(slug) {
        return Err(not_found());
    }
    let name = format!("{}.md", slug);
    let text = origin.fetch_text(&name).await?.ok_or_else(not_found)?;
    parse_post(&text, &name, link_style)
}

/// Reads the page layout, falling back to the built-in one.
pub async fn load_layout(path: &Path) -> Result<String> {
    match fs::read_to_string(path).await {
        Ok(layout) => Ok(layout),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No layout at {}, using the built-in one", path.display());
            Ok(DEFAULT_LAYOUT.to_string())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn reload_content(app_state: &AppState) {
    info!("Reloading application content...");
    match load_layout(&app_state.config.layout_path()).await {
        Ok(layout) => *app_state.layout_html.write().await = layout,
        Err(e) => error!("Failed to reload layout: {}", e),
    }
    match load_collection(&app_state.config, &app_state.origin).await {
        Ok(collection) => {
            *app_state.posts.write().await = Some(collection.into());
            info!("Content successfully reloaded.");
        }
        Err(e) => {
            *app_state.posts.write().await = None;
            error!("Failed to reload content: {}", e);
        }
    }
}

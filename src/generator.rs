use std::path::{Path, PathBuf};

use htmlescape::encode_minimal;
use tokio::fs;
use tracing::{debug, info};

use crate::collection::PostCollection;
use crate::content_loader::list_markdown_files;
use crate::error::Result;
use crate::frontmatter::parse_post;
use crate::models::{DisplayablePost, LinkStyle, ParsedPost};
use crate::render::fill_placeholders;

pub struct GenerateOptions {
    pub posts_dir: PathBuf,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, PartialEq)]
pub struct GenerateReport {
    pub pages: Vec<PathBuf>,
    pub manifest: PathBuf,
}

/// Substitutes every placeholder occurrence in a single pass, so a value
/// that itself looks like `{{name}}` is left as written. Metadata is escaped,
/// the rendered body is inserted as-is.
pub fn fill_template(template: &str, post: &ParsedPost) -> String {
    fill_placeholders(template, |name| {
        let value = match name {
            "title" => Some(post.title()),
            "date" => post.date(),
            "author" => post.author(),
            "image" => post.image(),
            "label" => post.label(),
            "description" => post.description(),
            "slug" => Some(post.slug()),
            "content" => return Some(post.html_content.clone()),
            _ => return None,
        };
        Some(encode_minimal(value.unwrap_or_default()))
    })
}

/// Writes `<slug>.html` for every markdown source plus `manifest.json`.
/// The first malformed source aborts the run.
pub async fn generate(options: &GenerateOptions) -> Result<GenerateReport> {
    let template = fs::read_to_string(&options.template_path).await?;
    fs::create_dir_all(&options.output_dir).await?;

    let mut posts = Vec::new();
    for name in list_markdown_files(&options.posts_dir).await? {
        let text = fs::read_to_string(options.posts_dir.join(&name)).await?;
        posts.push(parse_post(&text, &name, LinkStyle::Static)?);
    }

    let mut pages = Vec::with_capacity(posts.len());
    for post in &posts {
        let path = options.output_dir.join(format!("{}.html", post.slug()));
        fs::write(&path, fill_template(&template, post)).await?;
        debug!("Wrote {}", path.display());
        pages.push(path);
    }

    let manifest = write_manifest(&options.output_dir, PostCollection::from_parsed(posts)).await?;
    info!("Post generation complete! {} pages", pages.len());
    Ok(GenerateReport { pages, manifest })
}

async fn write_manifest(output_dir: &Path, collection: PostCollection) -> Result<PathBuf> {
    let path = output_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(&collection.manifest())?;
    fs::write(&path, json).await?;
    Ok(path)
}

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::content_loader::Origin;
use crate::error::Result;
use crate::models::LinkStyle;

const DEFAULT_CONFIG_FILE: &str = "blog.toml";

/// Whether the front end reads every markdown file or a single manifest.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Markdown,
    Manifest,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub site_title: String,
    pub content_dir: PathBuf,
    pub source: SourceKind,
    /// Remote origin for posts; local `content_dir/posts` when unset.
    pub base_url: Option<String>,
    /// Markdown file names to load instead of scanning the posts directory.
    pub files: Option<Vec<String>>,
    pub link_style: LinkStyle,
    pub template: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub port: u16,
    #[serde(skip)]
    pub is_development: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            site_title: "My Blog".to_string(),
            content_dir: PathBuf::from("content"),
            source: SourceKind::Markdown,
            base_url: None,
            files: None,
            link_style: LinkStyle::Query,
            template: None,
            output_dir: PathBuf::from("dist/posts"),
            port: 8080,
            is_development: false,
        }
    }
}

impl Config {
    /// Reads `path`, or `blog.toml` when present, then applies `PORT` and
    /// `RUST_ENV` from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Config::default(),
        };
        config.apply_env(std::env::var("PORT").ok(), std::env::var("RUST_ENV").ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading config from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    fn apply_env(&mut self, port: Option<String>, rust_env: Option<String>) {
        if let Some(port) = port.and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        self.is_development = rust_env.is_some_and(|v| v == "development");
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.content_dir.join("posts")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.content_dir.join("static")
    }

    pub fn layout_path(&self) -> PathBuf {
        self.content_dir.join("templates/layout.html")
    }

    pub fn template_path(&self) -> PathBuf {
        self.template
            .clone()
            .unwrap_or_else(|| self.content_dir.join("templates/post-template.html"))
    }

    pub fn origin(&self) -> Origin {
        match &self.base_url {
            Some(base_url) => Origin::remote(base_url),
            None => Origin::Local(self.posts_dir()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_is_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.site_title, "My Blog");
        assert_eq!(config.source, SourceKind::Markdown);
        assert_eq!(config.link_style, LinkStyle::Query);
        assert_eq!(config.posts_dir(), PathBuf::from("content/posts"));
        assert_eq!(
            config.template_path(),
            PathBuf::from("content/templates/post-template.html")
        );
    }

    #[test]
    fn reads_toml_fields() {
        let config: Config = toml::from_str(
            r#"
site_title = "Notes"
source = "manifest"
link_style = "static"
base_url = "https://cdn.example.com/posts"
files = ["a.md", "b.md"]
"#,
        )
        .unwrap();
        assert_eq!(config.site_title, "Notes");
        assert_eq!(config.source, SourceKind::Manifest);
        assert_eq!(config.link_style, LinkStyle::Static);
        assert_eq!(config.files.as_deref(), Some(&["a.md".to_string(), "b.md".to_string()][..]));
        assert!(matches!(config.origin(), Origin::Remote { .. }));
    }

    #[test]
    fn rejects_unknown_source_kind() {
        assert!(toml::from_str::<Config>("source = \"yaml\"").is_err());
    }

    #[test]
    fn env_overrides_port_and_mode() {
        let mut config = Config::default();
        config.apply_env(Some("3000".into()), Some("development".into()));
        assert_eq!(config.port, 3000);
        assert!(config.is_development);

        config.apply_env(Some("not-a-port".into()), None);
        assert_eq!(config.port, 3000);
        assert!(!config.is_development);
    }

    #[test]
    fn loads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(&path, "site_title = \"From File\"\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.site_title, "From File");
    }
}

//! A small blog front end: markdown posts with `key: value` front matter,
//! served as an index with category filters and per-post detail pages, plus
//! a build-time generator for static post pages.

pub mod collection;
pub mod config;
pub mod content_loader;
pub mod error;
pub mod excerpt;
pub mod frontmatter;
pub mod generator;
pub mod hot_reload;
pub mod markdown;
pub mod models;
pub mod render;
pub mod server;
pub mod state;

pub use collection::{Category, PostCollection};
pub use error::BlogError;
pub use frontmatter::parse_post;
pub use models::{DisplayablePost, ManifestPost, ParsedPost, Post};

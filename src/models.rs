use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::excerpt::extract_excerpt;

pub const EXCERPT_LENGTH: usize = 100;
pub const FEATURED_EXCERPT_LENGTH: usize = 200;
const SUMMARY_LENGTH: usize = 160;

/// Where a post's `url` points: `/post.html?slug=..` or `/posts/...html`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    #[default]
    Query,
    Static,
}

impl LinkStyle {
    pub fn post_url(self, slug: &str) -> String {
        match self {
            LinkStyle::Query => format!("/post.html?slug={}", slug),
            LinkStyle::Static => format!("/posts/{}.html", slug),
        }
    }
}

/// Metadata shared by manifest entries and parsed markdown posts.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PostMeta {
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Keys nothing renders, kept so they survive a manifest round trip.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PostMeta {
    /// Builds metadata from front-matter pairs. `slug` and `url` always come
    /// from the caller, even if the front matter carries keys of that name.
    pub fn from_fields(mut fields: BTreeMap<String, String>, slug: &str, url: String) -> Self {
        fields.remove("slug");
        fields.remove("url");
        PostMeta {
            slug: slug.to_string(),
            title: fields.remove("title"),
            date: fields.remove("date"),
            author: fields.remove("author"),
            label: fields.remove("label"),
            description: fields.remove("description"),
            image: fields.remove("image"),
            url: Some(url),
            extra: fields
                .into_iter()
                .map(|(key, value)| (key, serde_json::Value::String(value)))
                .collect(),
        }
    }
}

/// A manifest entry: metadata only, no body.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct ManifestPost {
    pub meta: PostMeta,
}

/// A post parsed from a markdown source.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPost {
    pub meta: PostMeta,
    pub content: String,
    pub html_content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Post {
    Manifest(ManifestPost),
    Parsed(ParsedPost),
}

/// Read-only view every renderer works against.
pub trait DisplayablePost {
    fn meta(&self) -> &PostMeta;

    fn content(&self) -> Option<&str> {
        None
    }

    fn html_content(&self) -> Option<&str> {
        None
    }

    fn slug(&self) -> &str {
        &self.meta().slug
    }

    fn title(&self) -> &str {
        self.meta().title.as_deref().unwrap_or("")
    }

    fn date(&self) -> Option<&str> {
        self.meta().date.as_deref()
    }

    fn author(&self) -> Option<&str> {
        self.meta().author.as_deref()
    }

    fn label(&self) -> Option<&str> {
        self.meta().label.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.meta().description.as_deref().filter(|d| !d.is_empty())
    }

    fn image(&self) -> Option<&str> {
        self.meta().image.as_deref().filter(|i| !i.is_empty())
    }

    fn url(&self) -> &str {
        self.meta().url.as_deref().unwrap_or("")
    }

    /// The description, or an excerpt of the body when there is none.
    fn excerpt(&self, length: usize) -> String {
        match self.description() {
            Some(description) => description.to_string(),
            None => self
                .content()
                .map(|content| extract_excerpt(content, length))
                .unwrap_or_default(),
        }
    }

    /// Text for `<meta name="description">` and friends.
    fn summary(&self) -> String {
        match self.description() {
            Some(description) => description.to_string(),
            None => self
                .content()
                .map(|content| content.chars().take(SUMMARY_LENGTH).collect())
                .unwrap_or_default(),
        }
    }
}

impl DisplayablePost for ManifestPost {
    fn meta(&self) -> &PostMeta {
        &self.meta
    }
}

impl DisplayablePost for ParsedPost {
    fn meta(&self) -> &PostMeta {
        &self.meta
    }

    fn content(&self) -> Option<&str> {
        Some(&self.content)
    }

    fn html_content(&self) -> Option<&str> {
        Some(&self.html_content)
    }
}

impl DisplayablePost for Post {
    fn meta(&self) -> &PostMeta {
        match self {
            Post::Manifest(post) => post.meta(),
            Post::Parsed(post) => post.meta(),
        }
    }

    fn content(&self) -> Option<&str> {
        match self {
            Post::Manifest(post) => post.content(),
            Post::Parsed(post) => post.content(),
        }
    }

    fn html_content(&self) -> Option<&str> {
        match self {
            Post::Manifest(post) => post.html_content(),
            Post::Parsed(post) => post.html_content(),
        }
    }
}

impl Post {
    pub fn published_at(&self) -> Option<NaiveDateTime> {
        self.date().and_then(parse_date)
    }
}

/// Parses the date shapes post authors actually write.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// `June 15, 2023`, or `Invalid Date` when the value can't be read.
pub fn format_date(raw: Option<&str>) -> String {
    raw.and_then(parse_date)
        .map(|dt| dt.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| "Invalid Date".to_string())
}

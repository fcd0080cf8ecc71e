//! Front-matter parsing.
//!
//! The format is deliberately not YAML: a `---` line, one `key: value` pair
//! per line, a closing `---` line, then the markdown body. Values cannot
//! span lines.

use std::collections::BTreeMap;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{BlogError, Result};
use crate::markdown::render_markdown_to_html;
use crate::models::{LinkStyle, ParsedPost, PostMeta};

lazy_static! {
    static ref FRONT_MATTER: Regex =
        Regex::new(r"(?s)\A---\r?\n(?:(.*?)\r?\n)?---(?:\r?\n|\z)").unwrap();
}

/// Raw metadata block and the body that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter<'a> {
    pub fields: BTreeMap<String, String>,
    pub body: &'a str,
}

impl<'a> FrontMatter<'a> {
    /// Splits `text` into its metadata and body. `source_name` only labels
    /// the error.
    pub fn parse(text: &'a str, source_name: &str) -> Result<Self> {
        let captures = FRONT_MATTER
            .captures(text)
            .ok_or_else(|| BlogError::MalformedInput {
                source_name: source_name.to_string(),
            })?;
        let block = captures.get(1).map_or("", |m| m.as_str());
        let body = &text[captures.get(0).map_or(0, |m| m.end())..];

        let mut fields = BTreeMap::new();
        for line in block.lines() {
            if let Some((key, value)) = parse_line(line) {
                fields.insert(key, value);
            }
        }
        Ok(FrontMatter { fields, body })
    }
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), unquote(value.trim()).to_string()))
}

/// Strips one layer of matching single or double quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// `posts/hello-world.md` -> `hello-world`.
pub fn slug_from_path(path: &str) -> String {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
        .to_string()
}

/// Parses a markdown source into a post. The slug comes from `path`.
pub fn parse_post(text: &str, path: &str, link_style: LinkStyle) -> Result<ParsedPost> {
    let slug = slug_from_path(path);
    let front_matter = FrontMatter::parse(text, path)?;
    let url = link_style.post_url(&slug);

    Ok(ParsedPost {
        meta: PostMeta::from_fields(front_matter.fields, &slug, url),
        content: front_matter.body.to_string(),
        html_content: render_markdown_to_html(front_matter.body),
    })
}

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FENCED_CODE: Regex = Regex::new(r"(?s)```.*?```").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`[^`]+`").unwrap();
    static ref MARKUP: Regex = Regex::new(r"[#*\-_]").unwrap();
    static ref LINK: Regex = Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap();
}

/// Plain-text excerpt of a markdown body, cut at `length` characters.
pub fn extract_excerpt(content: &str, length: usize) -> String {
    let text = FENCED_CODE.replace_all(content, "");
    let text = INLINE_CODE.replace_all(&text, "");
    let text = MARKUP.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");

    let mut excerpt: String = text.chars().take(length).collect();
    if text.chars().count() > length {
        excerpt.push_str("...");
    }
    excerpt
}

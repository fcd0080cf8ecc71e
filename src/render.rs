//! HTML for the index and detail pages.
//!
//! Every function takes the posts it shows and returns markup; nothing here
//! reads shared state.

use htmlescape::{encode_attribute, encode_minimal};
use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use regex::{Captures, Regex};

use crate::collection::{Category, CollectionView, PostCollection};
use crate::models::{format_date, DisplayablePost, Post, EXCERPT_LENGTH, FEATURED_EXCERPT_LENGTH};

const HOT_RELOAD_SCRIPT: &str = r#"
<script>
    const socket = new WebSocket("ws://" + window.location.host + "/ws");
    socket.onmessage = (event) => {
        if (event.data === "reload") {
            window.location.reload();
        }
    };
</script>
"#;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap();
}

/// Replaces every `{{name}}` / `{{ name }}` in one pass over `template`.
/// Substituted values are never rescanned; unknown names stay as written.
pub fn fill_placeholders<F>(template: &str, value: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            value(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn render_with_layout(
    layout: &str,
    title: &str,
    meta: &str,
    content: &str,
    is_development: bool,
) -> String {
    let layout = if is_development {
        layout.replace("</body>", &format!("{}</body>", HOT_RELOAD_SCRIPT))
    } else {
        layout.to_string()
    };

    fill_placeholders(&layout, |name| match name {
        "title" => Some(encode_minimal(title)),
        "meta" => Some(meta.to_string()),
        "content" => Some(content.to_string()),
        _ => None,
    })
}

fn render_image(post: &impl DisplayablePost, class: &str) -> String {
    match post.image() {
        Some(image) => format!(
            "<img src=\"{}\" alt=\"{}\" class=\"{}\" loading=\"lazy\">",
            encode_attribute(image),
            encode_attribute(post.title()),
            class
        ),
        None => String::new(),
    }
}

fn render_byline(post: &impl DisplayablePost) -> String {
    let author = post
        .author()
        .map(|author| format!("<span class=\"post-author\">By {}</span>", encode_minimal(author)))
        .unwrap_or_default();
    format!(
        "<div class=\"post-meta\">{}<span class=\"post-date\">{}</span></div>",
        author,
        format_date(post.date())
    )
}

pub fn render_featured(post: &impl DisplayablePost) -> String {
    let label = post
        .label()
        .map(|label| format!(" \u{2022} {}", encode_minimal(label)))
        .unwrap_or_default();
    format!(
        r#"<article class="featured-post-card">
<div class="featured-image">{image}</div>
<div class="featured-content">
<span class="featured-label">Featured{label}</span>
<h2><a href="{url}">{title}</a></h2>
{byline}
<p class="post-excerpt">{excerpt}</p>
<a href="{url}" class="read-more">Read More</a>
</div>
</article>"#,
        image = render_image(post, "featured-img"),
        label = label,
        url = encode_attribute(post.url()),
        title = encode_minimal(post.title()),
        byline = render_byline(post),
        excerpt = encode_minimal(&post.excerpt(FEATURED_EXCERPT_LENGTH)),
    )
}

pub fn render_card(post: &impl DisplayablePost) -> String {
    let label = post
        .label()
        .map(|label| format!("<span class=\"post-label\">{}</span>", encode_minimal(label)))
        .unwrap_or_default();
    format!(
        r#"<article class="post-card">
<div class="post-image">{image}{label}</div>
<div class="post-content">
<h2><a href="{url}">{title}</a></h2>
{byline}
<p class="post-excerpt">{excerpt}</p>
<a href="{url}" class="read-more">Read More</a>
</div>
</article>"#,
        image = render_image(post, "card-img"),
        label = label,
        url = encode_attribute(post.url()),
        title = encode_minimal(post.title()),
        byline = render_byline(post),
        excerpt = encode_minimal(&post.excerpt(EXCERPT_LENGTH)),
    )
}

pub fn render_cards(posts: &[&Post], empty_message: &str) -> String {
    if posts.is_empty() {
        return format!("<div class=\"no-posts\">{}</div>", empty_message);
    }
    posts.iter().map(|post| render_card(*post)).collect()
}

fn category_href(category: &Category) -> String {
    match category {
        Category::All => format!("/?category={}", Category::ALL),
        Category::Label(label) => {
            format!("/?category={}", utf8_percent_encode(label, NON_ALPHANUMERIC))
        }
    }
}

pub fn render_categories(categories: &[Category], active: &Category) -> String {
    categories
        .iter()
        .map(|category| {
            let class = if category == active { " class=\"active\"" } else { "" };
            format!(
                "<li><a href=\"{}\"{}>{}</a></li>",
                category_href(category),
                class,
                encode_minimal(&category.to_string())
            )
        })
        .collect()
}

/// Index body for one category: the first matching post is featured and the
/// remaining matches become cards.
pub fn render_index(collection: &PostCollection, active: &Category) -> String {
    let filtered = collection.filter(active);
    let view = CollectionView::new(&filtered);
    let empty_message = match active {
        Category::Label(_) if view.featured.is_none() => "No posts found in this category.",
        _ => "No blog posts found.",
    };

    format!(
        r#"<section class="featured-post">{featured}</section>
<ul class="categories">{categories}</ul>
<section class="blog-posts">{cards}</section>"#,
        featured = view.featured.map(render_featured).unwrap_or_default(),
        categories = render_categories(&collection.categories(), active),
        cards = render_cards(view.rest, empty_message),
    )
}

pub fn render_load_error() -> String {
    r#"<section class="blog-posts"><div class="error">Failed to load posts. Please refresh the page.</div></section>"#
        .to_string()
}

/// Detail view body.
pub fn render_post(post: &impl DisplayablePost) -> String {
    let label = post
        .label()
        .map(|label| format!("<span class=\"post-category\">{}</span>", encode_minimal(label)))
        .unwrap_or_default();
    let image = post
        .image()
        .map(|image| {
            format!(
                "<img src=\"{}\" alt=\"{}\" class=\"post-featured-image\" loading=\"lazy\">",
                encode_attribute(image),
                encode_attribute(post.title())
            )
        })
        .unwrap_or_default();
    let author = post
        .author()
        .map(|author| format!("<span class=\"post-author\">By {}</span>", encode_minimal(author)))
        .unwrap_or_default();

    format!(
        r#"<article id="post-content">
<div class="post-header">
<h1>{title}</h1>
<div class="post-meta">{author}<span class="post-date">{date}</span>{label}</div>
{image}
</div>
<div class="post-body">{body}</div>
<div class="post-footer"><a href="/" class="back-to-blog">&larr; Back to Blog</a></div>
</article>"#,
        title = encode_minimal(post.title()),
        author = author,
        date = format_date(post.date()),
        label = label,
        image = image,
        body = post.html_content().unwrap_or_default(),
    )
}

/// `<meta>` tags for a detail page.
pub fn render_post_meta(post: &impl DisplayablePost) -> String {
    let summary = encode_attribute(&post.summary());
    let mut meta = format!(
        "<meta name=\"description\" content=\"{summary}\">\n\
         <meta property=\"og:title\" content=\"{}\">\n\
         <meta property=\"og:description\" content=\"{summary}\">",
        encode_attribute(post.title()),
    );
    if let Some(image) = post.image() {
        meta.push_str(&format!(
            "\n<meta property=\"og:image\" content=\"{}\">",
            encode_attribute(image)
        ));
    }
    meta
}

pub fn post_page_title(post: &impl DisplayablePost, site_title: &str) -> String {
    format!("{} | {}", post.title(), site_title)
}

pub fn render_not_found() -> String {
    r#"<div class="error">
<h2>Post Not Found</h2>
<p>The requested post could not be loaded.</p>
<a href="/" class="back-to-blog">Return to Blog Home</a>
</div>"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ManifestPost, ParsedPost, PostMeta};
    use scraper::{Html, Selector};

    fn meta(slug: &str, label: &str, date: &str) -> PostMeta {
        PostMeta {
            slug: slug.to_string(),
            title: Some(format!("Title {}", slug)),
            date: Some(date.to_string()),
            label: Some(label.to_string()),
            author: Some("Jane".to_string()),
            url: Some(format!("/post.html?slug={}", slug)),
            ..Default::default()
        }
    }

    fn parsed(slug: &str, label: &str, date: &str) -> ParsedPost {
        ParsedPost {
            meta: meta(slug, label, date),
            content: format!("Body of **{}**", slug),
            html_content: format!("<p>Body of <strong>{}</strong></p>", slug),
        }
    }

    fn sample() -> PostCollection {
        PostCollection::from_parsed(vec![
            parsed("a", "Tech", "2023-06-15"),
            parsed("b", "Life", "2023-06-14"),
            parsed("c", "Tech", "2023-06-13"),
        ])
    }

    fn select(doc: &Html, selector: &str) -> Vec<String> {
        let selector = Selector::parse(selector).unwrap();
        doc.select(&selector)
            .map(|el| el.text().collect::<String>())
            .collect()
    }

    #[test]
    fn index_features_newest_post() {
        let doc = Html::parse_fragment(&render_index(&sample(), &Category::All));
        assert_eq!(select(&doc, ".featured-post h2"), ["Title a"]);
        assert_eq!(select(&doc, ".post-card h2"), ["Title b", "Title c"]);
        assert_eq!(select(&doc, ".categories a"), ["All", "Tech", "Life"]);
        assert_eq!(select(&doc, ".categories a.active"), ["All"]);
        assert_eq!(select(&doc, ".featured-post .post-excerpt"), ["Body of a"]);
    }

    #[test]
    fn category_view_refeatures_from_the_subset() {
        let doc = Html::parse_fragment(&render_index(&sample(), &Category::Label("Life".into())));
        assert_eq!(select(&doc, ".featured-post h2"), ["Title b"]);
        assert!(select(&doc, ".post-card").is_empty());
        assert_eq!(select(&doc, ".no-posts"), ["No blog posts found."]);
        assert_eq!(select(&doc, ".categories a.active"), ["Life"]);
    }

    #[test]
    fn unknown_category_shows_empty_state() {
        let doc = Html::parse_fragment(&render_index(&sample(), &Category::Label("Travel".into())));
        assert!(select(&doc, ".featured-post-card").is_empty());
        assert_eq!(select(&doc, ".no-posts"), ["No posts found in this category."]);
    }

    #[test]
    fn empty_collection_says_so() {
        let doc = Html::parse_fragment(&render_index(&PostCollection::default(), &Category::All));
        assert_eq!(select(&doc, ".no-posts"), ["No blog posts found."]);
    }

    #[test]
    fn escapes_metadata() {
        let mut post = parsed("x", "Tech", "2023-01-01");
        post.meta.title = Some("<script>alert(1)</script>".into());
        let html = render_card(&post);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn category_links_are_encoded() {
        let html = render_categories(&[Category::Label("Food & Drink".into())], &Category::All);
        assert!(html.contains("/?category=Food%20%26%20Drink"));
        assert!(html.contains(">Food &amp; Drink<"));
    }

    #[test]
    fn manifest_cards_use_description() {
        let post = ManifestPost {
            meta: PostMeta {
                description: Some("From the manifest".into()),
                ..meta("m", "Tech", "not a date")
            },
        };
        let doc = Html::parse_fragment(&render_card(&post));
        assert_eq!(select(&doc, ".post-excerpt"), ["From the manifest"]);
        assert_eq!(select(&doc, ".post-date"), ["Invalid Date"]);
    }

    #[test]
    fn detail_page_shows_body_and_meta() {
        let mut post = parsed("a", "Tech", "2023-06-15");
        post.meta.image = Some("/static/a.png".into());
        let doc = Html::parse_fragment(&render_post(&post));
        assert_eq!(select(&doc, "h1"), ["Title a"]);
        assert_eq!(select(&doc, ".post-body strong"), ["a"]);
        assert_eq!(select(&doc, ".post-date"), ["June 15, 2023"]);
        assert_eq!(select(&doc, ".post-author"), ["By Jane"]);
        assert_eq!(select(&doc, ".post-featured-image").len(), 1);

        let meta = Html::parse_fragment(&render_post_meta(&post));
        let content = |selector: &str| {
            let selector = Selector::parse(selector).unwrap();
            meta.select(&selector)
                .next()
                .and_then(|el| el.value().attr("content"))
                .map(str::to_string)
        };
        assert_eq!(content("meta[name=description]").as_deref(), Some("Body of **a**"));
        assert_eq!(content("meta[property=\"og:image\"]").as_deref(), Some("/static/a.png"));
        assert_eq!(post_page_title(&post, "My Blog"), "Title a | My Blog");
    }

    #[test]
    fn layout_injects_reload_script_only_in_development() {
        let layout = "<title>{{ title }}</title>{{ meta }}<main>{{ content }}</main></body>";
        let page = render_with_layout(layout, "A & B", "", "<p>hi</p>", false);
        assert_eq!(page, "<title>A &amp; B</title><main><p>hi</p></main></body>");

        let page = render_with_layout(layout, "t", "", "", true);
        assert!(page.contains("new WebSocket"));
    }

    #[test]
    fn layout_values_are_not_expanded_again() {
        let layout = "<title>{{ title }}</title><main>{{ content }}</main>{{ unknown }}";
        let page = render_with_layout(layout, "{{ content }}", "", "<script>x()</script>", false);
        assert_eq!(
            page,
            "<title>{{ content }}</title><main><script>x()</script></main>{{ unknown }}"
        );
    }

    #[test]
    fn placeholders_accept_both_spacings() {
        let page = fill_placeholders("{{a}}-{{ a }}-{{b}}", |name| {
            (name == "a").then(|| "x".to_string())
        });
        assert_eq!(page, "x-x-{{b}}");
    }
}

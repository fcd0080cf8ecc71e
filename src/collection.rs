use std::fmt;

use crate::models::{DisplayablePost, ManifestPost, ParsedPost, Post};

/// A category filter. `All` is the unfiltered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    All,
    Label(String),
}

impl Category {
    pub const ALL: &'static str = "all";

    /// Maps the `?category=` query value; a missing value means `All`.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            None | Some(Category::ALL) | Some("") => Category::All,
            Some(label) => Category::Label(label.to_string()),
        }
    }

    pub fn matches(&self, post: &impl DisplayablePost) -> bool {
        match self {
            Category::All => true,
            Category::Label(label) => post.label() == Some(label.as_str()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::All => f.write_str("All"),
            Category::Label(label) => f.write_str(label),
        }
    }
}

/// The posts of one load cycle, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostCollection {
    posts: Vec<Post>,
}

/// What a page shows for a given category.
#[derive(Debug, Clone, Copy)]
pub struct CollectionView<'a> {
    pub featured: Option<&'a Post>,
    pub rest: &'a [&'a Post],
}

impl PostCollection {
    /// Posts parsed from markdown, newest first. Undated posts go last.
    pub fn from_parsed(posts: Vec<ParsedPost>) -> Self {
        let mut posts: Vec<Post> = posts.into_iter().map(Post::Parsed).collect();
        posts.sort_by_key(|post| std::cmp::Reverse(post.published_at()));
        PostCollection { posts }
    }

    /// Manifest entries keep the manifest's order.
    pub fn from_manifest(posts: Vec<ManifestPost>) -> Self {
        PostCollection {
            posts: posts.into_iter().map(Post::Manifest).collect(),
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn featured(&self) -> Option<&Post> {
        self.posts.first()
    }

    pub fn rest(&self) -> &[Post] {
        self.posts.get(1..).unwrap_or(&[])
    }

    /// `All` followed by each distinct label in first-appearance order.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = vec![Category::All];
        for label in self.posts.iter().filter_map(|post| post.label()) {
            if !categories
                .iter()
                .any(|c| matches!(c, Category::Label(l) if l == label))
            {
                categories.push(Category::Label(label.to_string()));
            }
        }
        categories
    }

    pub fn filter(&self, category: &Category) -> Vec<&Post> {
        self.posts.iter().filter(|post| category.matches(*post)).collect()
    }

    /// Last post with the slug wins, like a map keyed by slug would.
    pub fn find(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().rev().find(|post| post.slug() == slug)
    }

    /// Metadata-only entries for `manifest.json`.
    pub fn manifest(&self) -> Vec<ManifestPost> {
        self.posts
            .iter()
            .map(|post| ManifestPost {
                meta: post.meta().clone(),
            })
            .collect()
    }
}

impl<'a> CollectionView<'a> {
    /// Splits an already filtered list: first post featured, others as cards.
    pub fn new(filtered: &'a [&'a Post]) -> Self {
        CollectionView {
            featured: filtered.first().copied(),
            rest: filtered.get(1..).unwrap_or(&[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostMeta;

    fn post(slug: &str, date: Option<&str>, label: Option<&str>) -> ParsedPost {
        ParsedPost {
            meta: PostMeta {
                slug: slug.to_string(),
                date: date.map(str::to_string),
                label: label.map(str::to_string),
                ..Default::default()
            },
            content: String::new(),
            html_content: String::new(),
        }
    }

    fn slugs<'a>(posts: impl IntoIterator<Item = &'a Post>) -> Vec<&'a str> {
        posts.into_iter().map(|p| p.slug()).collect()
    }

    #[test]
    fn sorts_newest_first() {
        let collection = PostCollection::from_parsed(vec![
            post("older", Some("2023-06-10"), None),
            post("newer", Some("2023-06-15"), None),
        ]);
        assert_eq!(slugs(collection.posts()), ["newer", "older"]);
        assert_eq!(collection.featured().map(|p| p.slug()), Some("newer"));
        assert_eq!(slugs(collection.rest()), ["older"]);
    }

    #[test]
    fn undated_posts_sort_last_in_original_order() {
        let collection = PostCollection::from_parsed(vec![
            post("bad-a", Some("someday"), None),
            post("dated", Some("2020-01-01"), None),
            post("bad-b", None, None),
        ]);
        assert_eq!(slugs(collection.posts()), ["dated", "bad-a", "bad-b"]);
    }

    #[test]
    fn manifest_order_is_trusted() {
        let entry = |slug: &str, date: &str| ManifestPost {
            meta: PostMeta {
                slug: slug.to_string(),
                date: Some(date.to_string()),
                ..Default::default()
            },
        };
        let collection = PostCollection::from_manifest(vec![
            entry("old", "2020-01-01"),
            entry("new", "2024-01-01"),
        ]);
        assert_eq!(slugs(collection.posts()), ["old", "new"]);
    }

    #[test]
    fn derives_categories_in_first_appearance_order() {
        let collection = PostCollection::from_manifest(
            [Some("Tech"), Some("Life"), None, Some("Tech")]
                .into_iter()
                .enumerate()
                .map(|(i, label)| ManifestPost {
                    meta: PostMeta {
                        slug: i.to_string(),
                        label: label.map(str::to_string),
                        ..Default::default()
                    },
                })
                .collect(),
        );
        assert_eq!(
            collection.categories(),
            [
                Category::All,
                Category::Label("Tech".into()),
                Category::Label("Life".into())
            ]
        );
    }

    #[test]
    fn filters_by_exact_label() {
        let collection = PostCollection::from_parsed(vec![
            post("a", Some("2023-01-03"), Some("Tech")),
            post("b", Some("2023-01-02"), Some("Life")),
            post("c", Some("2023-01-01"), Some("life")),
        ]);
        let life = collection.filter(&Category::Label("Life".into()));
        assert_eq!(slugs(life), ["b"]);

        let all = collection.filter(&Category::All);
        assert_eq!(slugs(all), ["a", "b", "c"]);
    }

    #[test]
    fn filtered_view_features_first_match() {
        let collection = PostCollection::from_parsed(vec![
            post("a", Some("2023-01-03"), Some("Tech")),
            post("b", Some("2023-01-02"), Some("Life")),
            post("c", Some("2023-01-01"), Some("Life")),
        ]);
        let filtered = collection.filter(&Category::Label("Life".into()));
        let view = CollectionView::new(&filtered);
        assert_eq!(view.featured.map(|p| p.slug()), Some("b"));
        assert_eq!(slugs(view.rest.iter().copied()), ["c"]);

        let none = collection.filter(&Category::Label("Travel".into()));
        let view = CollectionView::new(&none);
        assert!(view.featured.is_none());
        assert!(view.rest.is_empty());
    }

    #[test]
    fn query_values_map_to_categories() {
        assert_eq!(Category::from_query(None), Category::All);
        assert_eq!(Category::from_query(Some("all")), Category::All);
        assert_eq!(Category::from_query(Some("All")), Category::Label("All".into()));
    }

    #[test]
    fn find_prefers_the_last_duplicate() {
        let mut first = post("dup", Some("2023-01-02"), Some("first"));
        first.content = "one".into();
        let second = post("dup", Some("2023-01-01"), Some("second"));
        let collection = PostCollection::from_parsed(vec![first, second]);
        assert_eq!(collection.find("dup").and_then(|p| p.label()), Some("second"));
        assert!(collection.find("missing").is_none());
    }

    #[test]
    fn empty_collection_has_no_featured_post() {
        let collection = PostCollection::default();
        assert!(collection.featured().is_none());
        assert!(collection.rest().is_empty());
        assert_eq!(collection.categories(), [Category::All]);
    }
}

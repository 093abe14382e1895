use super::format::Locale;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: String,
    pub url: String,
    pub first_publication_date: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: String,
    pub url: String,
    pub first_publication_date: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,
    pub content: Vec<ContentSection>,
    pub reading_time_minutes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub url: Option<String>,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub heading: String,
    pub body_html: String,
    pub body_text: String,
}

/// One fetched page of summaries. `next_page` is the CMS's opaque URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostsPage {
    pub results: Vec<PostSummary>,
    pub next_page: Option<String>,
}

/// Summaries accumulated across "load more" fetches.
#[derive(Debug, Clone, Default)]
pub struct PostListing {
    posts: Vec<PostSummary>,
    seen: HashSet<String>,
    next_page: Option<String>,
}

impl PostListing {
    pub fn new(first: PostsPage) -> Self {
        let mut listing = Self::default();
        listing.append(first);
        listing
    }

    /// Appends the page's posts in order, skipping uids already listed, and
    /// takes over its next-page token. Returns how many posts were added.
    pub fn append(&mut self, page: PostsPage) -> usize {
        let before = self.posts.len();
        for post in page.results {
            if self.seen.insert(post.uid.clone()) {
                self.posts.push(post);
            }
        }
        self.next_page = page.next_page;
        self.posts.len() - before
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlogConfig {
    pub document_type: String,
    pub page_size: u32,
    pub post_url_prefix: String,
    pub index_template: String,
    pub post_template: String,
    pub fallback_template: String,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
}

fn default_words_per_minute() -> u32 {
    200
}

impl BlogConfig {
    /// Fields requested for listing pages.
    pub fn summary_fields(&self) -> Vec<String> {
        ["title", "content", "subtitle", "author"]
            .iter()
            .map(|field| format!("{}.{}", self.document_type, field))
            .collect()
    }

    pub fn post_url(&self, uid: &str) -> String {
        format!("{}/{}", self.post_url_prefix.trim_end_matches('/'), uid)
    }
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            document_type: String::from("post"),
            page_size: 5,
            post_url_prefix: String::from("/post"),
            index_template: String::from("index.html.liquid"),
            post_template: String::from("post.html.liquid"),
            fallback_template: String::from("fallback.html.liquid"),
            locale: Locale::default(),
            words_per_minute: default_words_per_minute(),
        }
    }
}

use super::types::{BlogConfig, PostDetail, PostSummary};
use serde::Serialize;

/// Response body of the "load more" endpoint. `next_page` is a URL the
/// browser can fetch directly, or null when the listing is exhausted.
#[derive(Debug, Serialize)]
pub struct LoadMoreResponse<'a> {
    pub results: &'a [PostSummary],
    pub next_page: Option<String>,
}

fn summary_object(post: &PostSummary) -> liquid::Object {
    liquid::object!({
        "uid": post.uid,
        "url": post.url,
        "first_publication_date": post.first_publication_date,
        "title": post.title,
        "subtitle": post.subtitle,
        "author": post.author,
    })
}

pub fn index_globals(
    posts: &[PostSummary],
    load_more_url: Option<&str>,
    base_url: &str,
) -> liquid::Object {
    let posts: Vec<liquid::model::Value> = posts
        .iter()
        .map(|post| liquid::model::Value::Object(summary_object(post)))
        .collect();

    liquid::object!({
        "posts": posts,
        "has_more": load_more_url.is_some(),
        "load_more_url": load_more_url.unwrap_or(""),
        "page_title": "Posts",
        "og_type": "website",
        "og_url": format!("{}/", base_url),
    })
}

pub fn post_globals(post: &PostDetail, config: &BlogConfig, base_url: &str) -> liquid::Object {
    let content: Vec<liquid::model::Value> = post
        .content
        .iter()
        .map(|section| {
            liquid::model::Value::Object(liquid::object!({
                "heading": section.heading,
                "body_html": section.body_html,
            }))
        })
        .collect();

    liquid::object!({
        "post": {
            "uid": post.uid,
            "url": post.url,
            "first_publication_date": post.first_publication_date,
            "title": post.title,
            "subtitle": post.subtitle,
            "author": post.author,
            "banner_url": post.banner.url.clone().unwrap_or_default(),
            "banner_alt": post.banner.alt.clone().unwrap_or_default(),
            "content": content,
            "reading_time": post.reading_time_minutes,
        },
        "page_title": post.title,
        "meta_description": post.subtitle,
        "og_type": "article",
        "og_url": format!("{}{}", base_url, config.post_url(&post.uid)),
    })
}

pub fn fallback_globals() -> liquid::Object {
    liquid::object!({
        "page_title": "Carregando...",
    })
}

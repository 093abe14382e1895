mod common;

use async_trait::async_trait;
use common::{output_dir, spawn_fake_cms, test_config, unreachable_endpoint};
use serde_json::{Value, json};
use spacetraveling::{
    cms::{CmsClient, CmsError, HttpCmsClient, Query, SearchResponse},
    generate::{GenerateError, GenerateReport, generate_site},
    posts::{BlogService, PostsError},
    templating::TemplateEngine,
};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const PAGE_TWO: &str = "https://cms.example/api/v2/documents/search?page=2";

/// Serves one post on the first page, linking to `PAGE_TWO`. Following that
/// link either fails or returns a page whose `next_page` is `PAGE_TWO` again.
struct ScriptedCms {
    next_page_fails: bool,
}

fn post_document(uid: &str) -> Value {
    json!({
        "id": uid,
        "uid": uid,
        "type": "post",
        "first_publication_date": "2021-03-15T19:25:28+0000",
        "data": {"title": uid, "subtitle": "", "author": "", "content": []}
    })
}

fn search_response(uid: &str, next_page: Option<&str>) -> SearchResponse {
    serde_json::from_value(json!({
        "page": 1,
        "results_per_page": 1,
        "total_results_size": 2,
        "total_pages": 2,
        "next_page": next_page,
        "results": [post_document(uid)],
    }))
    .unwrap()
}

#[async_trait]
impl CmsClient for ScriptedCms {
    async fn query(&self, query: &Query) -> Result<SearchResponse, CmsError> {
        if query.predicate_string().contains(".uid") {
            let uid = if query.predicate_string().contains("second") {
                "second"
            } else {
                "first"
            };
            return Ok(search_response(uid, None));
        }
        Ok(search_response("first", Some(PAGE_TWO)))
    }

    async fn fetch_page(&self, url: &str) -> Result<SearchResponse, CmsError> {
        if self.next_page_fails {
            return Err(CmsError::Status {
                status: 500,
                url: url.to_string(),
            });
        }
        Ok(search_response("second", Some(PAGE_TWO)))
    }
}

async fn generate_scripted(
    cms: ScriptedCms,
    temp_dir: &TempDir,
) -> Result<GenerateReport, GenerateError> {
    let config = test_config("https://cms.example/api/v2", None);
    let blog = BlogService::new(config.blog.clone(), Arc::new(cms));
    let engine = TemplateEngine::new(config.templates.directory.clone(), config.site_globals());

    tokio::time::timeout(
        Duration::from_secs(10),
        generate_site(&config, &blog, &engine, output_dir(temp_dir)),
    )
    .await
    .expect("generation did not finish")
}

async fn generate_with(
    endpoint: &str,
    temp_dir: &TempDir,
) -> Result<GenerateReport, GenerateError> {
    let config = test_config(endpoint, None);
    let client = HttpCmsClient::new(
        &config.cms.endpoint,
        config.cms.access_token.clone(),
        config.cms_timeout(),
    )
    .unwrap();
    let blog = BlogService::new(config.blog.clone(), Arc::new(client));
    let engine = TemplateEngine::new(config.templates.directory.clone(), config.site_globals());

    generate_site(&config, &blog, &engine, output_dir(temp_dir)).await
}

#[tokio::test]
async fn test_generate_full_site() {
    let endpoint = spawn_fake_cms(None).await;
    let temp_dir = TempDir::new().unwrap();

    let report = generate_with(&endpoint, &temp_dir).await.unwrap();
    assert_eq!(report.pages, 2);
    assert_eq!(report.posts, 3);
    assert!(report.failed_posts.is_empty());

    let out = output_dir(&temp_dir);

    let index = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(index.contains("Como utilizar Hooks"));
    assert!(index.contains("Criando um app CRA do zero"));
    assert!(!index.contains("Mapas com React"));
    assert!(index.contains(r#"data-next="/api/posts/page-2.json""#));

    let page: Value =
        serde_json::from_str(&fs::read_to_string(out.join("api/posts/page-2.json")).unwrap())
            .unwrap();
    assert_eq!(page["results"][0]["uid"], "mapas-com-react");
    assert!(page["next_page"].is_null());
    assert!(!out.join("api/posts/page-3.json").exists());

    for uid in [
        "como-utilizar-hooks",
        "criando-um-app-cra-do-zero",
        "mapas-com-react",
    ] {
        let path = out.join("post").join(uid).join("index.html");
        assert!(path.exists(), "missing {:?}", path);
    }

    let post = fs::read_to_string(out.join("post/como-utilizar-hooks/index.html")).unwrap();
    assert!(post.contains("<h1>Como utilizar Hooks</h1>"));
    assert!(post.contains("<p><strong>Lorem</strong> ipsum dolor sit amet</p>"));

    let fallback = fs::read_to_string(out.join("fallback.html")).unwrap();
    assert!(fallback.contains("Carregando..."));

    assert!(out.join("robots.txt").exists());
    assert!(out.join("static/styles.css").exists());
    assert!(out.join("static/load-more.js").exists());
}

#[tokio::test]
async fn test_generate_fails_when_cms_is_down() {
    let endpoint = unreachable_endpoint().await;
    let temp_dir = TempDir::new().unwrap();

    let result = generate_with(&endpoint, &temp_dir).await;
    assert!(matches!(result, Err(GenerateError::Posts(PostsError::Cms(_)))));
    assert!(!output_dir(&temp_dir).join("index.html").exists());
}

#[tokio::test]
async fn test_generate_fails_when_a_later_page_fails() {
    let temp_dir = TempDir::new().unwrap();

    let result = generate_scripted(
        ScriptedCms {
            next_page_fails: true,
        },
        &temp_dir,
    )
    .await;

    assert!(matches!(
        result,
        Err(GenerateError::Posts(PostsError::Cms(CmsError::Status {
            status: 500,
            ..
        })))
    ));
    assert!(!output_dir(&temp_dir).join("api/posts/page-2.json").exists());
}

#[tokio::test]
async fn test_generate_stops_on_repeated_page_url() {
    let temp_dir = TempDir::new().unwrap();

    let report = generate_scripted(
        ScriptedCms {
            next_page_fails: false,
        },
        &temp_dir,
    )
    .await
    .unwrap();
    assert_eq!(report.pages, 2);
    assert_eq!(report.posts, 2);

    let out = output_dir(&temp_dir);
    let page: Value =
        serde_json::from_str(&fs::read_to_string(out.join("api/posts/page-2.json")).unwrap())
            .unwrap();
    assert_eq!(page["results"][0]["uid"], "second");
    assert!(page["next_page"].is_null());
    assert!(!out.join("api/posts/page-3.json").exists());
    assert!(out.join("post/second/index.html").exists());
}

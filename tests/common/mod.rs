#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use spacetraveling::Config;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const MASTER_REF: &str = "master-ref";

#[derive(Clone)]
struct FakeCmsState {
    base: String,
    token: Option<String>,
}

/// Starts a CMS lookalike on an ephemeral port and returns its API root.
/// It serves three posts, two per page, and requires `token` when given.
pub async fn spawn_fake_cms(token: Option<&str>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = FakeCmsState {
        base: format!("http://{}/api/v2", addr),
        token: token.map(str::to_string),
    };
    let endpoint = state.base.clone();

    let app = Router::new()
        .route("/api/v2", get(api_root))
        .route("/api/v2/documents/search", get(search))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    endpoint
}

/// An API root on a port nothing listens on.
pub async fn unreachable_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/v2", addr)
}

fn authorized(state: &FakeCmsState, params: &HashMap<String, String>) -> bool {
    match &state.token {
        Some(token) => params.get("access_token") == Some(token),
        None => true,
    }
}

async fn api_root(
    State(state): State<FakeCmsState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&state, &params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    Json(json!({
        "refs": [
            {"id": "master", "ref": MASTER_REF, "label": "Master", "isMasterRef": true}
        ]
    }))
    .into_response()
}

async fn search(
    State(state): State<FakeCmsState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&state, &params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if params.get("ref").map(String::as_str) != Some(MASTER_REF) {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let q = params.get("q").cloned().unwrap_or_default();
    if q.contains(".uid") {
        let uid = q.split('"').nth(1).unwrap_or_default();
        let results: Vec<Value> = all_posts()
            .into_iter()
            .filter(|post| post["uid"] == uid)
            .collect();
        return Json(page_body(1, results, None)).into_response();
    }

    let page: usize = params
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);
    let posts = all_posts();
    let start = (page - 1) * 2;
    let results: Vec<Value> = posts.iter().skip(start).take(2).cloned().collect();

    let next_page = if start + 2 < posts.len() {
        let mut url = format!(
            "{}/documents/search?ref={}&q={}&pageSize=2&page={}",
            state.base,
            MASTER_REF,
            urlencoding::encode(&q),
            page + 1
        );
        if let Some(token) = &state.token {
            url.push_str(&format!("&access_token={}", token));
        }
        Some(url)
    } else {
        None
    };

    Json(page_body(page, results, next_page)).into_response()
}

fn page_body(page: usize, results: Vec<Value>, next_page: Option<String>) -> Value {
    json!({
        "page": page,
        "results_per_page": 2,
        "results_size": results.len(),
        "total_results_size": 3,
        "total_pages": 2,
        "next_page": next_page,
        "prev_page": null,
        "results": results,
    })
}

fn all_posts() -> Vec<Value> {
    vec![
        json!({
            "id": "P1",
            "uid": "como-utilizar-hooks",
            "type": "post",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "last_publication_date": "2021-03-15T19:25:28+0000",
            "data": {
                "title": "Como utilizar Hooks",
                "subtitle": "Pensando em sincronização em vez de ciclos de vida.",
                "author": "Joseph Oliveira",
                "banner": {"url": "https://images.example/hooks.png", "alt": "Hooks"},
                "content": [
                    {
                        "heading": "Proin et varius",
                        "body": [
                            {"type": "paragraph", "text": "Lorem ipsum dolor sit amet", "spans": [
                                {"start": 0, "end": 5, "type": "strong"}
                            ]}
                        ]
                    }
                ]
            }
        }),
        json!({
            "id": "P2",
            "uid": "criando-um-app-cra-do-zero",
            "type": "post",
            "first_publication_date": "2021-03-19T10:00:00+0000",
            "data": {
                "title": [{"type": "heading1", "text": "Criando um app CRA do zero", "spans": []}],
                "subtitle": "Tudo sobre como criar a sua primeira aplicação.",
                "author": [{"type": "paragraph", "text": "Danilo Vieira", "spans": []}],
                "content": []
            }
        }),
        json!({
            "id": "P3",
            "uid": "mapas-com-react",
            "type": "post",
            "first_publication_date": "2021-04-02T08:00:00+0000",
            "data": {
                "title": "Mapas com React <3",
                "subtitle": "Leaflet na prática.",
                "author": "Ana Souza",
                "content": null
            }
        }),
    ]
}

/// Config pointing at the repository's own templates and static files.
pub fn test_config(endpoint: &str, token: Option<&str>) -> Config {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut config = Config::default();
    config.app.base_url = Some("http://blog.test".to_string());
    config.cms.endpoint = endpoint.to_string();
    config.cms.access_token = token.map(str::to_string);
    config.cms.timeout_secs = 5;
    config.templates.directory = root.join("templates");
    config.static_files.directory = root.join("static");
    config.blog.page_size = 2;
    config
}

pub fn output_dir(temp: &tempfile::TempDir) -> PathBuf {
    temp.path().join("dist")
}

use super::{PostsError, render};
use crate::{AppState, cms::CmsError};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{error, warn};

pub const LOAD_MORE_PATH: &str = "/api/posts";

#[derive(Deserialize)]
pub struct LoadMoreQuery {
    next: Option<String>,
}

/// Browser-facing URL that proxies the CMS page at `next_page`.
pub fn load_more_url(next_page: &str) -> String {
    format!("{}?next={}", LOAD_MORE_PATH, urlencoding::encode(next_page))
}

pub async fn posts_index_handler(State(app_state): State<AppState>) -> Response {
    let blog = &app_state.blog;

    let page = match blog.first_page().await {
        Ok(page) => page,
        Err(e) => {
            error!("Failed to load posts: {}", e);
            return fallback_response(&app_state).await;
        }
    };

    let load_more = page.next_page.as_deref().map(load_more_url);
    let globals = render::index_globals(
        &page.results,
        load_more.as_deref(),
        app_state.config.app.base_url(),
    );

    render_response(&app_state, &blog.get_config().index_template, globals).await
}

pub async fn post_detail_handler(
    State(app_state): State<AppState>,
    Path(uid): Path<String>,
) -> Response {
    let blog = &app_state.blog;

    let post = match blog.get_post(&uid).await {
        Ok(post) => post,
        Err(PostsError::PostNotFound(_)) => {
            return (StatusCode::NOT_FOUND, "Post not found").into_response();
        }
        Err(e) => {
            error!("Failed to load post {}: {}", uid, e);
            return fallback_response(&app_state).await;
        }
    };

    let globals = render::post_globals(&post, blog.get_config(), app_state.config.app.base_url());
    render_response(&app_state, &blog.get_config().post_template, globals).await
}

pub async fn load_more_handler(
    State(app_state): State<AppState>,
    Query(query): Query<LoadMoreQuery>,
) -> Response {
    let Some(next) = query.next.filter(|n| !n.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "Missing next page URL");
    };

    match app_state.blog.next_page(&next).await {
        Ok(page) => {
            let body = render::LoadMoreResponse {
                results: &page.results,
                next_page: page.next_page.as_deref().map(load_more_url),
            };
            Json(body).into_response()
        }
        Err(PostsError::Cms(CmsError::ForeignPageUrl(url))) => {
            warn!("Rejected foreign page URL: {}", url);
            json_error(StatusCode::BAD_REQUEST, "Invalid next page URL")
        }
        Err(e) => {
            error!("Failed to load next page: {}", e);
            json_error(StatusCode::BAD_GATEWAY, "Failed to load posts")
        }
    }
}

async fn render_response(app_state: &AppState, template: &str, globals: liquid::Object) -> Response {
    match app_state.render_page(template, globals).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template rendering error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// Loading placeholder served while the CMS is unreachable.
async fn fallback_response(app_state: &AppState) -> Response {
    let template = &app_state.blog.get_config().fallback_template;
    let body = match app_state
        .render_page(template, render::fallback_globals())
        .await
    {
        Ok(html) => html,
        Err(e) => {
            error!("Template rendering error: {}", e);
            String::from("<h1>Carregando...</h1>")
        }
    };

    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::RETRY_AFTER, "30")],
        Html(body),
    )
        .into_response()
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

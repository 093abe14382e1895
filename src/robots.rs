use crate::AppState;
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::path::Path;

const DEFAULT_ROBOTS: &str = r#"# robots.txt for spacetraveling
User-agent: *
Allow: /
"#;

/// Custom `robots.txt` from the static directory, or the permissive default.
pub async fn robots_txt(static_dir: &Path) -> String {
    let custom_robots_path = static_dir.join("robots.txt");

    if custom_robots_path.exists() {
        match tokio::fs::read_to_string(&custom_robots_path).await {
            Ok(content) => return content,
            Err(e) => {
                tracing::error!("Failed to read custom robots.txt: {}", e);
            }
        }
    }

    DEFAULT_ROBOTS.to_string()
}

pub async fn robots_txt_handler(State(app_state): State<AppState>) -> Response {
    let body = robots_txt(&app_state.config.static_files.directory).await;

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

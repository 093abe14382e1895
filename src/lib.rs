use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::{Path as FsPath, PathBuf};
use std::time::Duration;

pub mod cms;
pub mod generate;
pub mod posts;
pub mod richtext;
pub mod robots;
pub mod startup_checks;
pub mod static_files;
pub mod templating;

#[cfg(test)]
mod templating_tests;

pub use posts::BlogConfig;

/// Environment variable that overrides `cms.access_token`.
pub const ACCESS_TOKEN_ENV: &str = "SPACETRAVELING_CMS_TOKEN";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub cms: CmsConfig,
    pub templates: TemplateConfig,
    pub static_files: StaticConfig,
    #[serde(default)]
    pub blog: BlogConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl AppConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or("http://localhost:3000")
            .trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CmsConfig {
    /// API root, e.g. `https://<repository>.cdn.prismic.io/api/v2`.
    pub endpoint: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerateConfig {
    pub output_directory: PathBuf,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("dist"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            app: AppConfig {
                name: "spacetraveling".to_string(),
                log_level: "info".to_string(),
                base_url: None,
            },
            cms: CmsConfig {
                endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
                access_token: None,
                timeout_secs: default_timeout_secs(),
            },
            templates: TemplateConfig {
                directory: PathBuf::from("templates"),
            },
            static_files: StaticConfig {
                directory: PathBuf::from("static"),
            },
            blog: BlogConfig::default(),
            generate: GenerateConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml_edit::de::Error),
}

impl Config {
    /// Reads `path` if it exists, otherwise starts from the defaults. The
    /// access token environment variable wins over the file either way.
    pub fn load(path: &FsPath) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml_edit::de::from_str::<Config>(&content)?
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Config::default()
        };

        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV)
            && !token.is_empty()
        {
            config.cms.access_token = Some(token);
        }

        Ok(config)
    }

    pub fn cms_timeout(&self) -> Duration {
        Duration::from_secs(self.cms.timeout_secs)
    }

    /// Globals every template sees.
    pub fn site_globals(&self) -> liquid::Object {
        liquid::object!({
            "site_name": self.app.name,
            "base_url": self.app.base_url(),
            "lang": self.blog.locale.html_lang(),
            "current_year": chrono::Utc::now().year(),
        })
    }
}

use axum::{
    Router,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use std::{collections::HashMap, sync::Arc};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub template_engine: Arc<templating::TemplateEngine>,
    pub static_handler: static_files::StaticFileHandler,
    pub blog: Arc<posts::BlogService>,
    pub config: Config,
}

impl AppState {
    /// Renders a page template with the static asset URLs added to `globals`.
    pub async fn render_page(
        &self,
        template: &str,
        globals: liquid::Object,
    ) -> Result<String, templating::TemplateError> {
        let mut full_globals = self.static_handler.asset_globals().await;
        full_globals.extend(globals);
        self.template_engine
            .render_template(template, full_globals)
            .await
    }
}

async fn static_file_handler(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    app_state
        .static_handler
        .serve(&path, params.contains_key("v"))
        .await
}

pub async fn create_app(config: Config) -> Result<Router, cms::CmsError> {
    let client = cms::HttpCmsClient::new(
        &config.cms.endpoint,
        config.cms.access_token.clone(),
        config.cms_timeout(),
    )?;

    Ok(create_app_with_client(config, Arc::new(client)).await)
}

pub async fn create_app_with_client(config: Config, client: Arc<dyn cms::CmsClient>) -> Router {
    let template_engine = Arc::new(templating::TemplateEngine::new(
        config.templates.directory.clone(),
        config.site_globals(),
    ));

    let static_handler =
        static_files::StaticFileHandler::new(config.static_files.directory.clone());
    static_handler.refresh_file_versions().await;

    let blog = Arc::new(posts::BlogService::new(config.blog.clone(), client));

    let post_route = format!(
        "{}/{{uid}}",
        config.blog.post_url_prefix.trim_end_matches('/')
    );

    let app_state = AppState {
        template_engine,
        static_handler,
        blog,
        config,
    };

    Router::new()
        .route(
            "/",
            axum::routing::get(posts::handlers::posts_index_handler),
        )
        .route(
            &post_route,
            axum::routing::get(posts::handlers::post_detail_handler),
        )
        .route(
            posts::handlers::LOAD_MORE_PATH,
            axum::routing::get(posts::handlers::load_more_handler),
        )
        .route(
            "/robots.txt",
            axum::routing::get(robots::robots_txt_handler),
        )
        .route("/static/{*path}", axum::routing::get(static_file_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let method = request.method();
                    let uri = request.uri();
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        uri = %uri,
                        matched_path,
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    let method = request.method();
                    let uri = request.uri();
                    let user_agent = request
                        .headers()
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        target: "access_log",
                        method = %method,
                        path = %uri.path(),
                        user_agent = %user_agent,
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            target: "access_log",
                            status = %response.status(),
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state)
}

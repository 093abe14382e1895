//! Renders the whole site into a directory that any static file host can
//! serve. "Load more" is backed by pre-rendered JSON pages instead of the
//! proxy endpoint used when serving.

use crate::{
    Config, robots,
    posts::{BlogService, PostListing, PostsError, PostsPage, render},
    static_files::StaticFileHandler,
    templating::{TemplateEngine, TemplateError},
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Posts error: {0}")]
    Posts(#[from] PostsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub pages: usize,
    pub posts: usize,
    pub failed_posts: Vec<String>,
}

/// URL of the pre-rendered JSON for listing page `page` (1-based).
pub fn page_json_url(page: usize) -> String {
    format!("/api/posts/page-{}.json", page)
}

pub async fn generate_site(
    config: &Config,
    blog: &BlogService,
    engine: &TemplateEngine,
    output_dir: PathBuf,
) -> Result<GenerateReport, GenerateError> {
    SiteGenerator::new(config, blog, engine, output_dir)
        .generate()
        .await
}

pub struct SiteGenerator<'a> {
    config: &'a Config,
    blog: &'a BlogService,
    engine: &'a TemplateEngine,
    static_handler: StaticFileHandler,
    output_dir: PathBuf,
}

impl<'a> SiteGenerator<'a> {
    pub fn new(
        config: &'a Config,
        blog: &'a BlogService,
        engine: &'a TemplateEngine,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            config,
            blog,
            engine,
            static_handler: StaticFileHandler::new(config.static_files.directory.clone()),
            output_dir,
        }
    }

    pub async fn generate(&self) -> Result<GenerateReport, GenerateError> {
        info!("Generating site into {:?}", self.output_dir);
        self.static_handler.refresh_file_versions().await;

        let mut report = GenerateReport::default();

        let first = self.blog.first_page().await?;
        let load_more = first.next_page.as_ref().map(|_| page_json_url(2));
        self.write_index(&first, load_more.as_deref()).await?;
        report.pages = 1;

        // Every page already written links to the next one, so a failed
        // fetch aborts the run instead of leaving a dead "load more".
        let mut visited = HashSet::new();
        let mut listing = PostListing::new(first);
        let mut page_number = 1;
        while let Some(next) = listing.next_page().map(str::to_string) {
            visited.insert(next.clone());
            page_number += 1;
            let page = self.blog.next_page(&next).await?;

            let repeated = page
                .next_page
                .as_ref()
                .is_some_and(|url| visited.contains(url));
            if repeated {
                warn!(
                    "Listing page {} links back to an earlier page, stopping",
                    page_number
                );
            }

            let next_url = page
                .next_page
                .as_ref()
                .filter(|_| !repeated)
                .map(|_| page_json_url(page_number + 1));
            self.write_page_json(page_number, &page, next_url).await?;
            let added = listing.append(page);
            info!("Listing page {}: {} new posts", page_number, added);
            report.pages += 1;

            if repeated {
                break;
            }
        }

        for post in listing.posts() {
            match self.write_post(&post.uid).await {
                Ok(()) => report.posts += 1,
                Err(e) => {
                    error!("Failed to generate post {}: {}", post.uid, e);
                    report.failed_posts.push(post.uid.clone());
                }
            }
        }

        let fallback = self
            .render(
                &self.config.blog.fallback_template,
                render::fallback_globals(),
            )
            .await?;
        self.write_file(&self.output_dir.join("fallback.html"), fallback.as_bytes())
            .await?;

        let robots = robots::robots_txt(&self.config.static_files.directory).await;
        self.write_file(&self.output_dir.join("robots.txt"), robots.as_bytes())
            .await?;

        self.copy_static_files().await?;

        info!(
            "Generated {} listing pages and {} posts ({} failed)",
            report.pages,
            report.posts,
            report.failed_posts.len()
        );
        Ok(report)
    }

    async fn render(
        &self,
        template: &str,
        globals: liquid::Object,
    ) -> Result<String, TemplateError> {
        let mut full_globals = self.static_handler.asset_globals().await;
        full_globals.extend(globals);
        self.engine.render_template(template, full_globals).await
    }

    async fn write_index(
        &self,
        page: &PostsPage,
        load_more_url: Option<&str>,
    ) -> Result<(), GenerateError> {
        let globals =
            render::index_globals(&page.results, load_more_url, self.config.app.base_url());
        let html = self
            .render(&self.config.blog.index_template, globals)
            .await?;
        self.write_file(&self.output_dir.join("index.html"), html.as_bytes())
            .await
    }

    async fn write_page_json(
        &self,
        page_number: usize,
        page: &PostsPage,
        next_url: Option<String>,
    ) -> Result<(), GenerateError> {
        let body = render::LoadMoreResponse {
            results: &page.results,
            next_page: next_url,
        };
        let json = serde_json::to_vec(&body)?;
        let path = self
            .output_dir
            .join(page_json_url(page_number).trim_start_matches('/'));
        self.write_file(&path, &json).await
    }

    async fn write_post(&self, uid: &str) -> Result<(), GenerateError> {
        let post = self.blog.get_post(uid).await?;
        let globals = render::post_globals(&post, &self.config.blog, self.config.app.base_url());
        let html = self
            .render(&self.config.blog.post_template, globals)
            .await?;

        let path = self
            .output_dir
            .join(self.config.blog.post_url(uid).trim_start_matches('/'))
            .join("index.html");
        self.write_file(&path, html.as_bytes()).await
    }

    async fn write_file(&self, path: &Path, contents: &[u8]) -> Result<(), GenerateError> {
        let io_error = |source| GenerateError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(path, contents).await.map_err(io_error)
    }

    async fn copy_static_files(&self) -> Result<(), GenerateError> {
        let static_dir = &self.config.static_files.directory;
        if !static_dir.exists() {
            return Ok(());
        }

        let target_dir = self.output_dir.join("static");
        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
        {
            let Ok(relative) = entry.path().strip_prefix(static_dir) else {
                continue;
            };
            let target = target_dir.join(relative);
            let contents = tokio::fs::read(entry.path())
                .await
                .map_err(|source| GenerateError::Io {
                    path: entry.path().to_path_buf(),
                    source,
                })?;
            self.write_file(&target, &contents).await?;
            copied += 1;
        }

        info!("Copied {} static files", copied);
        Ok(())
    }
}

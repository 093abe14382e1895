use std::{collections::HashMap, path::PathBuf, sync::Arc, time::SystemTime};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

type Partials = liquid::partials::EagerCompiler<liquid::partials::InMemorySource>;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse template {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to render template {path}: {message}")]
    Render { path: String, message: String },
}

pub struct TemplateEngine {
    template_dir: PathBuf,
    site_globals: liquid::Object,
    cache: Arc<RwLock<HashMap<String, CachedTemplate>>>,
}

struct CachedTemplate {
    content: String,
    modified: SystemTime,
}

impl TemplateEngine {
    /// `site_globals` are available to every template; per-page globals
    /// passed to `render_template` take precedence.
    pub fn new(template_dir: PathBuf, site_globals: liquid::Object) -> Self {
        Self {
            template_dir,
            site_globals,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn template_dir(&self) -> &PathBuf {
        &self.template_dir
    }

    async fn load_template(&self, path: &str) -> Result<String, TemplateError> {
        let template_path = self.template_dir.join(path);
        let io_error = |source| TemplateError::Io {
            path: path.to_string(),
            source,
        };

        let metadata = tokio::fs::metadata(&template_path).await.map_err(io_error)?;
        let modified = metadata.modified().map_err(io_error)?;

        let mut cache = self.cache.write().await;

        if let Some(cached) = cache.get(path)
            && cached.modified >= modified
        {
            debug!("Using cached template for {}", path);
            return Ok(cached.content.clone());
        }

        info!("Loading template: {}", path);

        let content = tokio::fs::read_to_string(&template_path)
            .await
            .map_err(io_error)?;

        cache.insert(
            path.to_string(),
            CachedTemplate {
                content: content.clone(),
                modified,
            },
        );

        Ok(content)
    }

    /// Every `_*.liquid` file under the template directory, keyed by file name.
    async fn load_partials(&self) -> Partials {
        let mut partials = Partials::empty();

        let names: Vec<(String, String)> = WalkDir::new(&self.template_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let file_name = entry.file_name().to_str()?.to_string();
                if !file_name.starts_with('_') || !file_name.ends_with(".liquid") {
                    return None;
                }
                let relative = entry
                    .path()
                    .strip_prefix(&self.template_dir)
                    .ok()?
                    .to_str()?
                    .replace('\\', "/");
                Some((file_name, relative))
            })
            .collect();

        for (name, relative) in names {
            match self.load_template(&relative).await {
                Ok(content) => {
                    partials.add(name, content);
                }
                Err(e) => warn!("Failed to load partial {}: {}", relative, e),
            }
        }

        partials
    }

    pub async fn render_template(
        &self,
        template_name: &str,
        globals: liquid::Object,
    ) -> Result<String, TemplateError> {
        let template_content = self.load_template(template_name).await?;
        let partials = self.load_partials().await;

        let parser = liquid::ParserBuilder::with_stdlib()
            .partials(partials)
            .build()
            .map_err(|e| TemplateError::Parse {
                path: template_name.to_string(),
                message: e.to_string(),
            })?;

        let template = parser
            .parse(&template_content)
            .map_err(|e| TemplateError::Parse {
                path: template_name.to_string(),
                message: e.to_string(),
            })?;

        let mut full_globals = self.site_globals.clone();
        full_globals.extend(globals);

        template
            .render(&full_globals)
            .map_err(|e| TemplateError::Render {
                path: template_name.to_string(),
                message: e.to_string(),
            })
    }
}

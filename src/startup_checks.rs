use crate::{Config, cms::client::parse_endpoint};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Invalid CMS endpoint: {0}")]
    InvalidCmsEndpoint(String),

    #[error("Templates directory does not exist: {0}")]
    TemplatesDirectoryMissing(String),

    #[error("Required template missing: {0}")]
    RequiredTemplateMissing(String),

    #[error("Static files directory does not exist")]
    StaticDirectoryMissing,
}

impl StartupCheckError {
    /// Whether the site cannot be served or generated at all.
    pub fn is_critical(&self) -> bool {
        !matches!(self, StartupCheckError::StaticDirectoryMissing)
    }
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    match parse_endpoint(&config.cms.endpoint) {
        Ok(url) => info!("CMS endpoint: {}", url),
        Err(e) => {
            error!("CMS endpoint is not usable: {}", e);
            errors.push(StartupCheckError::InvalidCmsEndpoint(
                config.cms.endpoint.clone(),
            ));
        }
    }

    if config.cms.access_token.is_some() {
        info!("CMS access token configured");
    }

    let templates_dir = &config.templates.directory;
    if !templates_dir.exists() {
        error!("Templates directory does not exist: {:?}", templates_dir);
        errors.push(StartupCheckError::TemplatesDirectoryMissing(
            templates_dir.display().to_string(),
        ));
    } else {
        info!("Templates directory exists: {:?}", templates_dir);

        let required = [
            &config.blog.index_template,
            &config.blog.post_template,
            &config.blog.fallback_template,
        ];
        for template in required {
            if !templates_dir.join(template).exists() {
                error!("Required template missing: {}", template);
                errors.push(StartupCheckError::RequiredTemplateMissing(template.clone()));
            }
        }
    }

    let static_dir = &config.static_files.directory;
    if !static_dir.exists() {
        warn!("Static files directory does not exist: {:?}", static_dir);
        errors.push(StartupCheckError::StaticDirectoryMissing);
    } else {
        info!("Static files directory exists: {:?}", static_dir);
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}

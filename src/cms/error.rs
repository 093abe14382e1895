use thiserror::Error;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("CMS responded with status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode CMS response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid CMS endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Page URL does not belong to the configured CMS: {0}")]
    ForeignPageUrl(String),

    #[error("CMS did not advertise a master ref")]
    MissingMasterRef,
}

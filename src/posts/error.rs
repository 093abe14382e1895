use crate::cms::CmsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostsError {
    #[error("CMS error: {0}")]
    Cms(#[from] CmsError),

    #[error("Post not found: {0}")]
    PostNotFound(String),
}

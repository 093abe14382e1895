pub mod core;
pub mod error;
pub mod format;
pub mod handlers;
pub mod render;
pub mod types;

pub use core::BlogService;
pub use error::PostsError;
pub use types::{BlogConfig, ContentSection, PostDetail, PostListing, PostSummary, PostsPage};

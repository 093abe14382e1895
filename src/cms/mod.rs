pub mod client;
pub mod error;
pub mod query;
pub mod types;

pub use client::{CmsClient, HttpCmsClient};
pub use error::CmsError;
pub use query::{Predicate, Query};
pub use types::{
    ApiInfo, ContentGroup, Document, ImageField, PostData, Ref, SearchResponse, TextField,
};

use super::{
    error::PostsError,
    format::{format_publication_date, reading_time},
    types::*,
};
use crate::{
    cms::{CmsClient, Document, Predicate, Query, SearchResponse, types::text_or_empty},
    richtext::{self, HtmlSerializer},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct BlogService {
    config: BlogConfig,
    client: Arc<dyn CmsClient>,
    serializer: HtmlSerializer,
}

impl BlogService {
    pub fn new(config: BlogConfig, client: Arc<dyn CmsClient>) -> Self {
        let serializer = HtmlSerializer::new(config.post_url_prefix.clone());
        Self {
            config,
            client,
            serializer,
        }
    }

    pub fn get_config(&self) -> &BlogConfig {
        &self.config
    }

    pub async fn first_page(&self) -> Result<PostsPage, PostsError> {
        let query = Query::new(Predicate::document_type(&self.config.document_type))
            .fetch(self.config.summary_fields())
            .page_size(self.config.page_size)
            .page(1);

        let response = self.client.query(&query).await?;
        info!(
            "Fetched first page: {} of {} posts",
            response.results.len(),
            response.total_results_size
        );
        Ok(self.to_page(response))
    }

    /// Follows a `next_page` URL handed out with an earlier page.
    pub async fn next_page(&self, url: &str) -> Result<PostsPage, PostsError> {
        let response = self.client.fetch_page(url).await?;
        debug!(
            "Fetched page {} with {} posts",
            response.page,
            response.results.len()
        );
        Ok(self.to_page(response))
    }

    pub async fn get_post(&self, uid: &str) -> Result<PostDetail, PostsError> {
        let document = self
            .client
            .get_by_uid(&self.config.document_type, uid)
            .await?
            .ok_or_else(|| PostsError::PostNotFound(uid.to_string()))?;

        Ok(self.to_detail(uid, document))
    }

    fn to_page(&self, response: SearchResponse) -> PostsPage {
        let results = response
            .results
            .into_iter()
            .filter_map(|document| self.to_summary(document))
            .collect();

        PostsPage {
            results,
            next_page: response.next_page,
        }
    }

    fn to_summary(&self, document: Document) -> Option<PostSummary> {
        let Some(uid) = document.uid else {
            warn!("Skipping document {} without uid", document.id);
            return None;
        };

        Some(PostSummary {
            url: self.config.post_url(&uid),
            first_publication_date: format_publication_date(
                document.first_publication_date.as_deref(),
                self.config.locale,
            ),
            title: text_or_empty(&document.data.title),
            subtitle: text_or_empty(&document.data.subtitle),
            author: text_or_empty(&document.data.author),
            uid,
        })
    }

    fn to_detail(&self, requested_uid: &str, document: Document) -> PostDetail {
        let uid = document
            .uid
            .clone()
            .unwrap_or_else(|| requested_uid.to_string());

        let content: Vec<ContentSection> = document
            .data
            .content
            .iter()
            .map(|group| ContentSection {
                heading: text_or_empty(&group.heading),
                body_html: self.serializer.serialize(&group.body),
                body_text: richtext::as_text(&group.body, " "),
            })
            .collect();

        let banner = document
            .data
            .banner
            .map(|image| Banner {
                url: image.url,
                alt: image.alt,
            })
            .unwrap_or_default();

        PostDetail {
            url: self.config.post_url(&uid),
            first_publication_date: format_publication_date(
                document.first_publication_date.as_deref(),
                self.config.locale,
            ),
            title: text_or_empty(&document.data.title),
            subtitle: text_or_empty(&document.data.subtitle),
            author: text_or_empty(&document.data.author),
            banner,
            reading_time_minutes: reading_time(&content, self.config.words_per_minute),
            content,
            uid,
        }
    }
}

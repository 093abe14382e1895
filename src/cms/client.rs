use super::{
    error::CmsError,
    query::{Predicate, Query},
    types::{ApiInfo, Document, SearchResponse},
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Runs `query` against the currently published content.
    async fn query(&self, query: &Query) -> Result<SearchResponse, CmsError>;

    /// Follows a `next_page` URL previously returned by the CMS.
    async fn fetch_page(&self, url: &str) -> Result<SearchResponse, CmsError>;

    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
    ) -> Result<Option<Document>, CmsError> {
        let query = Query::new(Predicate::uid(document_type, uid)).page_size(1);
        let response = self.query(&query).await?;
        Ok(response.results.into_iter().next())
    }
}

pub struct HttpCmsClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl HttpCmsClient {
    pub fn new(
        endpoint: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CmsError> {
        let endpoint = parse_endpoint(endpoint)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            access_token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn master_ref(&self) -> Result<String, CmsError> {
        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }

        let info: ApiInfo = self.get_json(url).await?;
        info.master_ref()
            .map(str::to_string)
            .ok_or(CmsError::MissingMasterRef)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CmsError> {
        debug!("CMS request: {}", redact(&url));

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("CMS responded {} for {}", status, redact(&url));
            return Err(CmsError::Status {
                status: status.as_u16(),
                url: redact(&url),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Page URLs in the response never carry the access token; `fetch_page`
    /// adds it back.
    async fn search(&self, url: Url) -> Result<SearchResponse, CmsError> {
        let mut response: SearchResponse = self.get_json(url).await?;
        response.next_page = response.next_page.map(|page| scrub_page_url(&page));
        response.prev_page = response.prev_page.map(|page| scrub_page_url(&page));
        Ok(response)
    }

    /// Accepts only URLs on the same origin as the endpoint.
    pub(crate) fn check_page_url(&self, url: &str) -> Result<Url, CmsError> {
        let parsed = Url::parse(url).map_err(|_| CmsError::ForeignPageUrl(url.to_string()))?;
        if parsed.scheme() != self.endpoint.scheme()
            || parsed.host_str() != self.endpoint.host_str()
            || parsed.port_or_known_default() != self.endpoint.port_or_known_default()
        {
            return Err(CmsError::ForeignPageUrl(url.to_string()));
        }
        Ok(parsed)
    }
}

#[async_trait]
impl CmsClient for HttpCmsClient {
    async fn query(&self, query: &Query) -> Result<SearchResponse, CmsError> {
        let reference = self.master_ref().await?;
        let url = query.to_url(&self.endpoint, &reference, self.access_token.as_deref());
        self.search(url).await
    }

    async fn fetch_page(&self, url: &str) -> Result<SearchResponse, CmsError> {
        let mut url = self.check_page_url(url)?;
        if let Some(token) = &self.access_token {
            url = strip_access_token(&url);
            url.query_pairs_mut().append_pair("access_token", token);
        }
        self.search(url).await
    }
}

pub fn parse_endpoint(endpoint: &str) -> Result<Url, CmsError> {
    let url = Url::parse(endpoint).map_err(|e| CmsError::InvalidEndpoint(e.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(CmsError::InvalidEndpoint(endpoint.to_string())),
    }
}

fn has_access_token(url: &Url) -> bool {
    url.query_pairs().any(|(k, _)| k == "access_token")
}

pub(crate) fn strip_access_token(url: &Url) -> Url {
    if !has_access_token(url) {
        return url.clone();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "access_token")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut clean = url.clone();
    clean.set_query(None);
    if !pairs.is_empty() {
        clean.query_pairs_mut().extend_pairs(pairs);
    }
    clean
}

fn scrub_page_url(page: &str) -> String {
    match Url::parse(page) {
        Ok(url) => strip_access_token(&url).to_string(),
        Err(_) => page.to_string(),
    }
}

// Keeps access tokens out of logs and error messages.
pub(crate) fn redact(url: &Url) -> String {
    if !has_access_token(url) {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "access_token" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    let mut clean = url.clone();
    clean.query_pairs_mut().clear().extend_pairs(pairs);
    clean.to_string()
}

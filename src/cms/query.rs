use std::fmt;
use url::Url;

/// Filter on a document path, rendered in the CMS query language.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn document_type(document_type: &str) -> Self {
        Self::at("document.type", document_type)
    }

    pub fn uid(document_type: &str, uid: &str) -> Self {
        Self::at(format!("my.{}.uid", document_type), uid)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "[at({}, \"{}\")]", path, escaped)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    pub fetch: Vec<String>,
    pub page_size: u32,
    pub page: u32,
}

impl Query {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicates: vec![predicate],
            fetch: Vec::new(),
            page_size: 20,
            page: 1,
        }
    }

    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// The `q` parameter: every predicate wrapped in one outer bracket pair.
    pub fn predicate_string(&self) -> String {
        let inner: String = self.predicates.iter().map(|p| p.to_string()).collect();
        format!("[{}]", inner)
    }

    /// Search URL under `endpoint` for this query against `reference`.
    pub fn to_url(&self, endpoint: &Url, reference: &str, access_token: Option<&str>) -> Url {
        let mut url = endpoint.clone();
        {
            let mut segments = url.path().trim_end_matches('/').to_string();
            segments.push_str("/documents/search");
            url.set_path(&segments);
        }

        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            pairs.append_pair("ref", reference);
            pairs.append_pair("q", &self.predicate_string());
            if !self.fetch.is_empty() {
                pairs.append_pair("fetch", &self.fetch.join(","));
            }
            pairs.append_pair("pageSize", &self.page_size.to_string());
            pairs.append_pair("page", &self.page.to_string());
            if let Some(token) = access_token {
                pairs.append_pair("access_token", token);
            }
        }

        url
    }
}

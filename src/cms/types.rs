use crate::richtext::{self, RichTextBlock};
use serde::{Deserialize, Deserializer, Serialize};

/// Root document of the CMS API, listing the available content refs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiInfo {
    pub refs: Vec<Ref>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Ref {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiInfo {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// One page of search results. `next_page` is an opaque URL owned by the CMS.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub total_results_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    #[serde(default)]
    pub results: Vec<Document>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub document_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: PostData,
}

/// Post fields. Every field is optional because a field selection on the
/// query leaves the unselected ones out of the response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostData {
    #[serde(default)]
    pub title: Option<TextField>,
    #[serde(default)]
    pub subtitle: Option<TextField>,
    #[serde(default)]
    pub author: Option<TextField>,
    #[serde(default)]
    pub banner: Option<ImageField>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentGroup>,
}

/// A text field is either key text (a bare string) or structured rich text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TextField {
    Plain(String),
    Rich(Vec<RichTextBlock>),
}

impl TextField {
    pub fn as_text(&self) -> String {
        match self {
            TextField::Plain(text) => text.clone(),
            TextField::Rich(blocks) => richtext::as_text(blocks, " "),
        }
    }
}

/// Plain text of an optional field, empty when the field is missing or null.
pub fn text_or_empty(field: &Option<TextField>) -> String {
    field.as_ref().map(TextField::as_text).unwrap_or_default()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImageField {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContentGroup {
    #[serde(default)]
    pub heading: Option<TextField>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<RichTextBlock>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

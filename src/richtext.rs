//! Structured text as delivered by the CMS, and its conversion to plain text
//! and HTML.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub oembed: Option<Embed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum BlockKind {
    #[serde(rename = "heading1")]
    Heading1,
    #[serde(rename = "heading2")]
    Heading2,
    #[serde(rename = "heading3")]
    Heading3,
    #[serde(rename = "heading4")]
    Heading4,
    #[serde(rename = "heading5")]
    Heading5,
    #[serde(rename = "heading6")]
    Heading6,
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "preformatted")]
    Preformatted,
    #[serde(rename = "list-item")]
    ListItem,
    #[serde(rename = "o-list-item")]
    OrderedListItem,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "embed")]
    Embed,
    #[serde(other)]
    Unknown,
}

/// Inline markup. `start` and `end` are UTF-16 offsets into the block text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default)]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

/// Payload of hyperlink and label spans; both shapes share this struct.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SpanData {
    #[serde(default)]
    pub link_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Embed {
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(rename = "type", default)]
    pub embed_type: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

/// Text of all blocks joined with `separator`. Images and embeds have no text.
pub fn as_text(blocks: &[RichTextBlock], separator: &str) -> String {
    blocks
        .iter()
        .filter(|b| !matches!(b.kind, BlockKind::Image | BlockKind::Embed))
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

pub struct HtmlSerializer {
    document_url_prefix: String,
}

impl HtmlSerializer {
    /// `document_url_prefix` is where links to other CMS documents point,
    /// e.g. `/post` turns a link to uid `hello` into `/post/hello`.
    pub fn new(document_url_prefix: impl Into<String>) -> Self {
        Self {
            document_url_prefix: document_url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn serialize(&self, blocks: &[RichTextBlock]) -> String {
        let mut html = String::new();
        let mut open_list: Option<&'static str> = None;

        for block in blocks {
            let list_tag = match block.kind {
                BlockKind::ListItem => Some("ul"),
                BlockKind::OrderedListItem => Some("ol"),
                _ => None,
            };

            if open_list != list_tag {
                if let Some(tag) = open_list {
                    html.push_str(&format!("</{}>", tag));
                }
                if let Some(tag) = list_tag {
                    html.push_str(&format!("<{}>", tag));
                }
                open_list = list_tag;
            }

            html.push_str(&self.serialize_block(block));
        }

        if let Some(tag) = open_list {
            html.push_str(&format!("</{}>", tag));
        }

        html
    }

    fn serialize_block(&self, block: &RichTextBlock) -> String {
        match block.kind {
            BlockKind::Heading1 => self.wrap("h1", block),
            BlockKind::Heading2 => self.wrap("h2", block),
            BlockKind::Heading3 => self.wrap("h3", block),
            BlockKind::Heading4 => self.wrap("h4", block),
            BlockKind::Heading5 => self.wrap("h5", block),
            BlockKind::Heading6 => self.wrap("h6", block),
            BlockKind::Paragraph => self.wrap("p", block),
            BlockKind::Preformatted => self.wrap("pre", block),
            BlockKind::ListItem | BlockKind::OrderedListItem => self.wrap("li", block),
            BlockKind::Image => match &block.url {
                Some(url) => format!(
                    r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                    escape_html(url),
                    escape_html(block.alt.as_deref().unwrap_or(""))
                ),
                None => String::new(),
            },
            BlockKind::Embed => match &block.oembed {
                Some(embed) => format!(
                    r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                    escape_html(embed.embed_url.as_deref().unwrap_or("")),
                    escape_html(embed.embed_type.as_deref().unwrap_or("")),
                    escape_html(embed.provider_name.as_deref().unwrap_or("")),
                    embed.html.as_deref().unwrap_or("")
                ),
                None => String::new(),
            },
            BlockKind::Unknown => String::new(),
        }
    }

    fn wrap(&self, tag: &str, block: &RichTextBlock) -> String {
        format!("<{tag}>{}</{tag}>", self.serialize_spans(&block.text, &block.spans))
    }

    /// Splits the text at every span boundary and wraps each segment in the
    /// spans covering it, outermost (earliest start, longest) first.
    fn serialize_spans(&self, text: &str, spans: &[Span]) -> String {
        let units: Vec<u16> = text.encode_utf16().collect();
        let len = units.len();

        let mut spans: Vec<&Span> = spans
            .iter()
            .filter(|s| s.start < s.end && s.start < len)
            .collect();
        spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut boundaries: Vec<usize> = vec![0, len];
        for span in &spans {
            boundaries.push(span.start);
            boundaries.push(span.end.min(len));
        }
        boundaries.sort_unstable();
        boundaries.dedup();

        let mut html = String::new();
        for window in boundaries.windows(2) {
            let (from, to) = (window[0], window[1]);
            let mut segment = escape_text(&String::from_utf16_lossy(&units[from..to]));

            for span in spans.iter().rev().filter(|s| s.start <= from && s.end >= to) {
                segment = self.wrap_span(span, segment);
            }

            html.push_str(&segment);
        }

        html
    }

    fn wrap_span(&self, span: &Span, inner: String) -> String {
        match span.kind {
            SpanKind::Strong => format!("<strong>{}</strong>", inner),
            SpanKind::Em => format!("<em>{}</em>", inner),
            SpanKind::Label => {
                let label = span
                    .data
                    .as_ref()
                    .and_then(|d| d.label.as_deref())
                    .unwrap_or("");
                format!(r#"<span class="{}">{}</span>"#, escape_html(label), inner)
            }
            SpanKind::Hyperlink => match span.data.as_ref().and_then(|d| self.link_for(d)) {
                Some((href, Some(target))) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">{}</a>"#,
                    escape_html(&href),
                    escape_html(&target),
                    inner
                ),
                Some((href, None)) => format!(r#"<a href="{}">{}</a>"#, escape_html(&href), inner),
                None => inner,
            },
            SpanKind::Unknown => inner,
        }
    }

    fn link_for(&self, data: &SpanData) -> Option<(String, Option<String>)> {
        match data.link_type.as_deref() {
            Some("Document") => data
                .uid
                .as_ref()
                .map(|uid| (format!("{}/{}", self.document_url_prefix, uid), None)),
            _ => data.url.clone().map(|url| (url, data.target.clone())),
        }
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn escape_text(raw: &str) -> String {
    escape_html(raw).replace('\n', "<br />")
}

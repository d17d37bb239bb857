// ABOUTME: Article struct holding the normalized result of extracting one URL.
// ABOUTME: Serializes either the full article schema or a compact failure record.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use url::Url;

/// The normalized result of extracting one URL.
///
/// A record is either a failure (`error` set, nothing else guaranteed) or a
/// success with non-empty `content`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub top_image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Serialize for Article {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(ref error) = self.error {
            let mut s = serializer.serialize_struct("Article", 3)?;
            s.serialize_field("error", error)?;
            s.serialize_field("url", &self.url)?;
            s.serialize_field("success", &false)?;
            return s.end();
        }

        let mut s = serializer.serialize_struct("Article", 10)?;
        s.serialize_field("title", &self.title)?;
        s.serialize_field("content", &self.content)?;
        s.serialize_field("summary", &self.summary)?;
        s.serialize_field("authors", &self.authors)?;
        s.serialize_field("publishDate", &self.publish_date)?;
        s.serialize_field("topImage", &self.top_image)?;
        s.serialize_field("images", &self.images)?;
        if self.keywords.is_empty() {
            s.skip_field("keywords")?;
        } else {
            s.serialize_field("keywords", &self.keywords)?;
        }
        s.serialize_field("source", &self.source)?;
        s.serialize_field("url", &self.url)?;
        s.end()
    }
}

impl Article {
    /// Create an empty article for `url` with `source` derived from it.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let source = source_of(&url);
        Self {
            url,
            source,
            ..Default::default()
        }
    }

    /// Create a failure record for `url`.
    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Returns true if this record marks a failed scrape.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Returns true if the body text is present and non-empty. Whitespace counts as content.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().map_or(false, |c| !c.is_empty())
    }

    /// Length of the body text in characters, 0 when absent.
    pub fn content_len(&self) -> usize {
        self.content.as_deref().map_or(0, |c| c.chars().count())
    }

    /// Format the article as a markdown document.
    pub fn format_markdown(&self) -> String {
        if let Some(ref error) = self.error {
            return format!("**Failed:** {}\n\nSource: {}", error, self.url);
        }

        let mut parts = Vec::new();

        if let Some(ref title) = self.title {
            if !title.is_empty() {
                parts.push(format!("# {}", title));
            }
        }

        let mut meta = Vec::new();
        if !self.authors.is_empty() {
            meta.push(format!("By {}", self.authors.join(", ")));
        }
        if let Some(ref date) = self.publish_date {
            meta.push(date.clone());
        }
        if !meta.is_empty() {
            parts.push(meta.join(" | "));
        }

        if !self.url.is_empty() {
            parts.push(format!("Source: {}", self.url));
        }

        if let Some(ref summary) = self.summary {
            if !summary.is_empty() {
                parts.push(format!("> {}", summary.replace('\n', " ")));
            }
        }

        if let Some(ref img) = self.top_image {
            if !img.is_empty() {
                parts.push(format!("![Lead Image]({})", img));
            }
        }

        let content = self.content.as_deref().unwrap_or("");
        if !parts.is_empty() && !content.is_empty() {
            parts.push("---".to_string());
        }
        if !content.is_empty() {
            parts.push(content.to_string());
        }

        parts.join("\n\n")
    }
}

/// Derive the source domain from a URL: the host without a leading `www.`,
/// keeping an explicit port.
pub fn source_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    match parsed.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

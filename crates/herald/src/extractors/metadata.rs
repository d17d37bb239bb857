// ABOUTME: Full-pipeline extractor: own download, readability scoring, metadata, and NLP enrichment.
// ABOUTME: Produces title, body, authors, date, images, keywords, and a keyword-ranked summary.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::article::Article;
use crate::error::ScrapeError;
use crate::dom::scoring::extract_best_nodes;
use crate::dom::text::blocks_text;
use crate::extractors::fields::{
    extract_all_values, extract_attr_first, extract_field_text_single, extract_first_attr,
    normalize_whitespace, parse_date, push_unique, resolve_url,
};
use crate::extractors::Extractor;
use crate::fetch::Fetcher;
use crate::nlp;

const TITLE_SELECTORS: &[&str] = &["meta[property='og:title']", "title", "h1"];

const AUTHOR_SELECTORS: &[&str] = &[
    "meta[name='author']",
    "meta[property='article:author']",
    "[itemprop='author']",
    "[rel='author']",
    ".byline",
    ".author",
];

const DATE_META_SELECTORS: &[&str] = &[
    "meta[property='article:published_time']",
    "meta[name='article:published_time']",
    "meta[itemprop='datePublished']",
    "meta[name='pubdate']",
    "meta[name='publishdate']",
    "meta[name='date']",
];

const TOP_IMAGE_META: &[&str] = &[
    "meta[property='og:image']",
    "meta[name='twitter:image']",
    "meta[property='twitter:image']",
];

/// Author names longer than this are treated as bios, not names.
const MAX_AUTHOR_WORDS: usize = 5;

static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());

/// Downloads the page itself and runs the complete parse + NLP pipeline.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    fetcher: Fetcher,
}

impl MetadataExtractor {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Extractor for MetadataExtractor {
    fn name(&self) -> &'static str {
        "metadata"
    }

    async fn extract(&self, url: &str, _html: Option<&str>) -> Option<Article> {
        let page = match self.fetcher.fetch_once(url).await {
            Ok(page) => page,
            Err(e) => {
                let err = ScrapeError::extract(url, "MetadataExtract", Some(e.into()));
                warn!(url, error = %err, "metadata extraction failed");
                return None;
            }
        };
        let article = parse_article(url, &page.text());
        debug!(
            url,
            content_len = article.content_len(),
            keywords = article.keywords.len(),
            "metadata extraction done"
        );
        Some(article)
    }
}

/// Parse a page into an article, including keywords and summary.
pub fn parse_article(url: &str, html: &str) -> Article {
    let doc = Html::parse_document(html);
    let base = Url::parse(url).ok();
    let mut article = Article::new(url);

    article.title = extract_field_text_single(&doc, TITLE_SELECTORS);
    article.authors = extract_authors(&doc);
    article.publish_date = extract_publish_date(&doc).map(|dt| dt.to_rfc3339());

    let body = extract_best_nodes(&doc);
    let content = blocks_text(body.iter().copied());

    let mut content_images = Vec::new();
    for node in &body {
        for img in node.select(&IMG) {
            if let Some(src) = img.value().attr("src").and_then(|s| resolve(&base, s)) {
                push_unique(&mut content_images, src);
            }
        }
    }

    for img in doc.select(&IMG) {
        if let Some(src) = img.value().attr("src").and_then(|s| resolve(&base, s)) {
            push_unique(&mut article.images, src);
        }
    }

    article.top_image = extract_first_attr(&doc, TOP_IMAGE_META, "content")
        .and_then(|src| resolve(&base, &src))
        .or_else(|| content_images.into_iter().next());

    if !content.is_empty() {
        let title = article.title.as_deref().unwrap_or("");
        article.keywords = nlp::keywords(&content, nlp::KEYWORD_COUNT);
        let summary = nlp::summarize(title, &content, nlp::SUMMARY_SENTENCES);
        article.summary = (!summary.is_empty()).then_some(summary);
    }
    article.content = Some(content);
    article
}

fn resolve(base: &Option<Url>, src: &str) -> Option<String> {
    match base {
        Some(base) => resolve_url(base, src),
        None => Url::parse(src.trim()).ok().map(|u| u.to_string()),
    }
}

/// Names from every author source, split on commas and "and", de-duplicated.
fn extract_authors(doc: &Html) -> Vec<String> {
    let mut authors = Vec::new();
    for sel in AUTHOR_SELECTORS {
        for value in extract_all_values(doc, sel) {
            for name in split_authors(&value) {
                push_unique(&mut authors, name);
            }
        }
    }
    authors
}

fn split_authors(raw: &str) -> Vec<String> {
    raw.split(',')
        .flat_map(|part| part.split(" and "))
        .map(|name| {
            let name = normalize_whitespace(name);
            let stripped = name
                .strip_prefix("By ")
                .or_else(|| name.strip_prefix("by "))
                .or_else(|| name.strip_prefix("BY "))
                .unwrap_or(&name);
            stripped.trim().to_string()
        })
        .filter(|name| !name.is_empty())
        .filter(|name| !name.contains("://") && !name.starts_with("www."))
        .filter(|name| name.split_whitespace().count() <= MAX_AUTHOR_WORDS)
        .collect()
}

fn extract_publish_date(doc: &Html) -> Option<chrono::DateTime<chrono::Utc>> {
    DATE_META_SELECTORS
        .iter()
        .filter_map(|sel| extract_attr_first(doc, sel, "content"))
        .chain(extract_attr_first(doc, "time[datetime]", "datetime"))
        .chain(extract_field_text_single(doc, &["time"]))
        .find_map(|raw| parse_date(&raw))
}

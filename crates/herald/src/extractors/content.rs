// ABOUTME: Cleaned-text extractor: own download, stopword-density paragraph scoring, meta summary.
// ABOUTME: Picks the container whose paragraphs read most like prose and returns only those paragraphs.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::article::Article;
use crate::error::ScrapeError;
use crate::dom::scoring::link_density;
use crate::extractors::fields::{
    extract_field_text_single, extract_first_attr, extract_meta_content, normalize_date,
    normalize_whitespace, push_unique, resolve_url,
};
use crate::extractors::Extractor;
use crate::fetch::Fetcher;
use crate::nlp;

/// A paragraph needs more stopwords than this to count as prose.
const MIN_STOPWORDS: usize = 2;
/// Paragraphs with more link text than this share are navigation.
const MAX_LINK_DENSITY: f64 = 0.5;

static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p, pre, td").unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());

/// Containers whose text is never article body.
const BOILERPLATE_TAGS: &[&str] = &["nav", "header", "footer", "aside", "form", "menu"];

static BOILERPLATE_HINTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)comment|footer|sidebar|\bnav|menu|share|social|related|promo|advert|cookie|subscribe|newsletter|breadcrumb|popup").unwrap()
});

/// Downloads the page itself and keeps only the densest run of prose.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    fetcher: Fetcher,
}

impl ContentExtractor {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Extractor for ContentExtractor {
    fn name(&self) -> &'static str {
        "content"
    }

    async fn extract(&self, url: &str, _html: Option<&str>) -> Option<Article> {
        let page = match self.fetcher.fetch_once(url).await {
            Ok(page) => page,
            Err(e) => {
                let err = ScrapeError::extract(url, "ContentExtract", Some(e.into()));
                warn!(url, error = %err, "content extraction failed");
                return None;
            }
        };
        let article = parse_cleaned(url, &page.text());
        debug!(url, content_len = article.content_len(), "content extraction done");
        Some(article)
    }
}

/// Parse a page into an article using stopword-density scoring.
pub fn parse_cleaned(url: &str, html: &str) -> Article {
    let doc = Html::parse_document(html);
    let base = Url::parse(url).ok();
    let mut article = Article::new(url);

    article.title = extract_field_text_single(&doc, &["meta[property='og:title']"])
        .or_else(|| extract_field_text_single(&doc, &["title"]).map(|t| clean_title(&t)))
        .filter(|t| !t.is_empty());

    article.summary = extract_first_attr(
        &doc,
        &["meta[name='description']", "meta[property='og:description']"],
        "content",
    );

    if let Some(author) = extract_meta_content(&doc, "meta[name='author']") {
        article.authors.push(author);
    }

    article.publish_date = extract_meta_content(&doc, "meta[property='article:published_time']")
        .and_then(|raw| normalize_date(&raw));

    article.keywords = extract_meta_content(&doc, "meta[name='keywords']")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    article.top_image = extract_meta_content(&doc, "meta[property='og:image']")
        .and_then(|src| base.as_ref().and_then(|b| resolve_url(b, &src)));

    let (content, container) = cleaned_text(&doc);
    if let (Some(container), Some(base)) = (container, base.as_ref()) {
        for img in container.select(&IMG) {
            if let Some(src) = img.value().attr("src").and_then(|s| resolve_url(base, s)) {
                push_unique(&mut article.images, src);
            }
        }
    }
    article.content = Some(content);
    article
}

/// Drop a trailing site name from a `<title>` such as "Story | Site" or "Story - Site".
fn clean_title(title: &str) -> String {
    for sep in [" | ", " - ", " — ", " :: "] {
        if let Some((head, _)) = title.rsplit_once(sep) {
            let head = head.trim();
            if !head.is_empty() {
                return head.to_string();
            }
        }
    }
    title.trim().to_string()
}

struct Paragraph<'a> {
    element: ElementRef<'a>,
    text: String,
}

/// Body text of the best container and the container itself.
fn cleaned_text(doc: &Html) -> (String, Option<ElementRef<'_>>) {
    let mut paragraphs = Vec::new();
    let mut scores: HashMap<NodeId, f64> = HashMap::new();
    let mut order: Vec<NodeId> = Vec::new();
    let mut taken: HashSet<NodeId> = HashSet::new();

    for element in doc.select(&PARAGRAPHS) {
        // A `p` inside a kept `td` is already part of that cell's text.
        if in_boilerplate(&element) || element.ancestors().any(|a| taken.contains(&a.id())) {
            continue;
        }
        let text = normalize_whitespace(&element.text().collect::<String>());
        let stopwords = nlp::stopword_count(&text);
        if stopwords <= MIN_STOPWORDS || link_density(&element) > MAX_LINK_DENSITY {
            continue;
        }

        let score = stopwords as f64;
        let parent = element.parent().and_then(ElementRef::wrap);
        if let Some(parent) = parent {
            bump(&mut scores, &mut order, parent.id(), score);
            if let Some(grandparent) = parent.parent().and_then(ElementRef::wrap) {
                bump(&mut scores, &mut order, grandparent.id(), score / 2.0);
            }
        }
        taken.insert(element.id());
        paragraphs.push(Paragraph { element, text });
    }

    let mut best: Option<(NodeId, f64)> = None;
    for id in order {
        let score = scores[&id];
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((id, score));
        }
    }

    let Some(container) = best
        .and_then(|(id, _)| doc.tree.get(id))
        .and_then(ElementRef::wrap)
    else {
        return (String::new(), None);
    };

    let text = paragraphs
        .into_iter()
        .filter(|p| p.element.ancestors().any(|a| a.id() == container.id()))
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("\n\n");
    (text, Some(container))
}

fn bump(scores: &mut HashMap<NodeId, f64>, order: &mut Vec<NodeId>, id: NodeId, by: f64) {
    let entry = scores.entry(id).or_insert_with(|| {
        order.push(id);
        0.0
    });
    *entry += by;
}

fn in_boilerplate(element: &ElementRef) -> bool {
    element.ancestors().filter_map(ElementRef::wrap).any(|a| {
        let el = a.value();
        BOILERPLATE_TAGS.contains(&el.name())
            || el.attr("class").map_or(false, |c| BOILERPLATE_HINTS.is_match(c))
            || el.attr("id").map_or(false, |i| BOILERPLATE_HINTS.is_match(i))
    })
}

// ABOUTME: Structural extractor that reads article fields through per-domain CSS locators.
// ABOUTME: Works on the already downloaded body only and builds a lead-sentence summary.

use async_trait::async_trait;
use dom_query::Document;
use tracing::debug;
use url::Url;

use crate::article::Article;
use crate::extractors::compiled;
use crate::extractors::fields::{normalize_date, resolve_url};
use crate::extractors::select::{all_attr, first_block_text, first_text};
use crate::extractors::selectors::{SelectorProfile, SelectorTable};
use crate::extractors::Extractor;
use crate::nlp;

/// Extracts with the profile whose domain key matches the page host.
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    table: SelectorTable,
}

impl SelectorExtractor {
    pub fn new(table: SelectorTable) -> Self {
        compiled::warm(&table);
        Self { table }
    }
}

#[async_trait]
impl Extractor for SelectorExtractor {
    fn name(&self) -> &'static str {
        "selector"
    }

    async fn extract(&self, url: &str, html: Option<&str>) -> Option<Article> {
        let Some(html) = html else {
            debug!(url, "selector extractor needs a fetched body");
            return None;
        };
        let profile = self.table.resolve_url(url);
        Some(extract_with_profile(url, html, profile))
    }
}

/// Read every field of `profile` out of `html`.
pub fn extract_with_profile(url: &str, html: &str, profile: &SelectorProfile) -> Article {
    let doc = Document::from(html);
    let mut article = Article::new(url);

    article.title = profile.title.as_deref().and_then(|css| first_text(&doc, css));
    article.content = profile
        .content
        .as_deref()
        .and_then(|css| first_block_text(&doc, css));
    article.publish_date = profile
        .date
        .as_deref()
        .and_then(|css| first_text(&doc, css))
        .and_then(|raw| normalize_date(&raw));
    if let Some(author) = profile.author.as_deref().and_then(|css| first_text(&doc, css)) {
        article.authors.push(author);
    }

    let base = site_root(url);
    for src in all_attr(&doc, "img[src]", "src") {
        let resolved = match base {
            Some(ref base) => resolve_url(base, &src),
            None if src.starts_with("http") => Some(src),
            None => None,
        };
        article.images.extend(resolved);
    }
    article.top_image = article.images.first().cloned();

    article.summary = article.content.as_deref().map(nlp::lead_summary);
    article
}

/// `scheme://host[:port]/` of a page URL.
fn site_root(url: &str) -> Option<Url> {
    let mut root = Url::parse(url).ok()?;
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    Some(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BBC_HTML: &str = r#"
        <html><head><title>ignored</title></head><body>
            <h1>  Storm hits   coast </h1>
            <div data-component="byline">By Jane Reporter</div>
            <time data-component="timestamp">2024-06-15T12:00:00Z</time>
            <article>
                <p>Winds reached record speeds. Homes lost power.</p>

                <p>Crews worked overnight. Roads reopened by noon.</p>
            </article>
            <img src="/images/storm.jpg">
            <img src="data:image/png;base64,AAAA">
            <img src="https://cdn.example.com/map.png">
            <img src="radar.gif">
        </body></html>
    "#;

    #[tokio::test]
    async fn extracts_with_domain_profile() {
        let extractor = SelectorExtractor::new(SelectorTable::builtin());
        let article = extractor
            .extract("https://www.bbc.com/news/world-1", Some(BBC_HTML))
            .await
            .unwrap();

        assert_eq!(article.title.as_deref(), Some("Storm hits coast"));
        assert_eq!(
            article.content.as_deref(),
            Some(
                "Winds reached record speeds. Homes lost power.\n\
                 Crews worked overnight. Roads reopened by noon."
            )
        );
        assert_eq!(article.authors, vec!["By Jane Reporter".to_string()]);
        assert_eq!(
            article.publish_date.as_deref(),
            Some("2024-06-15T12:00:00+00:00")
        );
        assert_eq!(article.source.as_deref(), Some("bbc.com"));
        assert_eq!(
            article.images,
            vec![
                "https://www.bbc.com/images/storm.jpg".to_string(),
                "https://cdn.example.com/map.png".to_string(),
                "https://www.bbc.com/radar.gif".to_string(),
            ]
        );
        assert_eq!(
            article.top_image.as_deref(),
            Some("https://www.bbc.com/images/storm.jpg")
        );
    }

    #[test]
    fn summary_is_first_three_sentences() {
        let article = extract_with_profile(
            "https://www.bbc.com/news/world-1",
            BBC_HTML,
            SelectorTable::builtin().resolve("bbc.com"),
        );
        assert_eq!(
            article.summary.as_deref(),
            Some("Winds reached record speeds. Homes lost power. Crews worked overnight.")
        );
    }

    #[test]
    fn fallback_profile_and_raw_date() {
        let html = r#"<html><body>
            <h1>Local news</h1>
            <div class="entry-content">Short story.</div>
            <span class="date">Sometime last week</span>
            <span class="author">Sam Writer</span>
        </body></html>"#;
        let table = SelectorTable::builtin();
        let article = extract_with_profile(
            "http://localhost:8080/story",
            html,
            table.resolve_url("http://localhost:8080/story"),
        );
        assert_eq!(article.content.as_deref(), Some("Short story."));
        assert_eq!(article.summary.as_deref(), Some("Short story."));
        assert_eq!(article.publish_date.as_deref(), Some("Sometime last week"));
        assert_eq!(article.authors, vec!["Sam Writer".to_string()]);
        assert_eq!(article.source.as_deref(), Some("localhost:8080"));
    }

    #[test]
    fn missing_fields_stay_empty() {
        let article = extract_with_profile(
            "https://example.com/a",
            "<html><body><p>nothing structured</p></body></html>",
            &SelectorProfile::default(),
        );
        assert_eq!(article.title, None);
        assert_eq!(article.content, None);
        assert_eq!(article.summary, None);
        assert!(article.authors.is_empty());
        assert!(article.images.is_empty());
        assert_eq!(article.top_image, None);
    }

    #[test]
    fn relative_images_use_site_root_with_port() {
        let html = r#"<img src="pics/a.jpg"><img src="/b.jpg">"#;
        let article = extract_with_profile(
            "http://127.0.0.1:9000/deep/path/page.html",
            html,
            &SelectorProfile::default(),
        );
        assert_eq!(
            article.images,
            vec![
                "http://127.0.0.1:9000/pics/a.jpg".to_string(),
                "http://127.0.0.1:9000/b.jpg".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn no_body_means_no_result() {
        let extractor = SelectorExtractor::new(SelectorTable::builtin());
        assert!(extractor.extract("https://example.com", None).await.is_none());
    }
}

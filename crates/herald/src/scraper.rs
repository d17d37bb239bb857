// ABOUTME: The Scraper orchestrator: cache lookup, fetch with retry, concurrent extraction, arbitration.
// ABOUTME: Also runs bounded-concurrency batches that return one Article per input URL, in order.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::arbitrate::arbitrate;
use crate::article::Article;
use crate::cache::ArticleCache;
use crate::error::ScrapeError;
use crate::extractors::{Extractor, ExtractorSet};
use crate::fetch::Fetcher;
use crate::options::{ScraperBuilder, ScraperOptions};

/// Scrapes news articles by running three extraction strategies and keeping the best result.
///
/// Cloning is cheap; clones share the HTTP client, the extractors and the cache directory.
#[derive(Clone)]
pub struct Scraper {
    fetcher: Fetcher,
    extractors: ExtractorSet,
    cache: Option<ArticleCache>,
    batch_concurrency: usize,
}

impl Scraper {
    /// Create a new ScraperBuilder.
    pub fn builder() -> ScraperBuilder {
        ScraperBuilder::new()
    }

    /// Create a Scraper without a cache from plain options.
    pub fn new(opts: ScraperOptions) -> Result<Self, ScrapeError> {
        Self::from_parts(opts, None, None, None, None)
    }

    pub(crate) fn from_parts(
        opts: ScraperOptions,
        cache: Option<ArticleCache>,
        metadata: Option<Arc<dyn Extractor>>,
        content: Option<Arc<dyn Extractor>>,
        selector: Option<Arc<dyn Extractor>>,
    ) -> Result<Self, ScrapeError> {
        let fetcher = Fetcher::new(&opts)?;
        let mut extractors = ExtractorSet::standard(&fetcher, opts.selectors.clone());
        if let Some(ex) = metadata {
            extractors.metadata = ex;
        }
        if let Some(ex) = content {
            extractors.content = ex;
        }
        if let Some(ex) = selector {
            extractors.selector = ex;
        }

        Ok(Self {
            fetcher,
            extractors,
            cache,
            batch_concurrency: opts.batch_concurrency.max(1),
        })
    }

    pub fn cache(&self) -> Option<&ArticleCache> {
        self.cache.as_ref()
    }

    pub fn extractors(&self) -> &ExtractorSet {
        &self.extractors
    }

    pub fn batch_concurrency(&self) -> usize {
        self.batch_concurrency
    }

    /// Scrape one URL.
    ///
    /// Never fails: problems are reported through an Article whose `error`
    /// field is set. Only successful results are written to the cache.
    pub async fn scrape_article(&self, url: &str) -> Article {
        match self.try_scrape(url).await {
            Ok(article) => article,
            Err(e) => {
                error!(url, error = %e, "scrape failed");
                Article::failure(url, e.article_message())
            }
        }
    }

    async fn try_scrape(&self, url: &str) -> Result<Article, ScrapeError> {
        if let Some(cache) = &self.cache {
            if let Some(entry) = cache.get(url).await {
                info!(url, "serving from cache");
                return Ok(entry.article);
            }
        }

        let page = self.fetcher.fetch(url).await?;
        let html: Arc<str> = Arc::from(page.text());
        debug!(url, status = page.status, bytes = html.len(), "page fetched");

        let candidates = self.run_extractors(url, html).await;
        let winner = arbitrate(url, candidates)?;
        if !winner.has_content() {
            return Err(ScrapeError::aggregate(url, "ScrapeArticle"));
        }

        if let Some(cache) = &self.cache {
            cache.put(url, &winner).await;
        }
        info!(url, content_len = winner.content_len(), "article scraped");
        Ok(winner)
    }

    /// Run all strategies at once; results come back in priority order.
    async fn run_extractors(&self, url: &str, html: Arc<str>) -> [Option<Article>; 3] {
        let [metadata, content, selector] = self.extractors.in_priority();
        let (m, c, s) = tokio::join!(
            spawn_extractor(metadata, url, &html),
            spawn_extractor(content, url, &html),
            spawn_extractor(selector, url, &html),
        );
        [settle(url, m), settle(url, c), settle(url, s)]
    }

    /// Scrape many URLs with at most `batch_concurrency` in flight.
    ///
    /// Returns exactly one Article per input, in input order.
    pub async fn scrape_multiple<S: AsRef<str>>(&self, urls: &[S]) -> Vec<Article> {
        let semaphore = Arc::new(Semaphore::new(self.batch_concurrency));
        let tasks: Vec<(String, JoinHandle<Article>)> = urls
            .iter()
            .map(|url| {
                let url = url.as_ref().to_string();
                let scraper = self.clone();
                let semaphore = Arc::clone(&semaphore);
                let task_url = url.clone();
                let handle = tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => return Article::failure(task_url, e.to_string()),
                    };
                    scraper.scrape_article(&task_url).await
                });
                (url, handle)
            })
            .collect();

        let (urls, handles): (Vec<String>, Vec<_>) = tasks.into_iter().unzip();
        let articles: Vec<Article> = join_all(handles)
            .await
            .into_iter()
            .zip(urls)
            .map(|(joined, url)| match joined {
                Ok(article) => article,
                Err(e) => {
                    error!(url = %url, error = %e, "scrape task aborted");
                    Article::failure(url, format!("scrape task failed: {e}"))
                }
            })
            .collect();

        let failed = articles.iter().filter(|a| a.is_failure()).count();
        info!(total = articles.len(), failed, "batch finished");
        articles
    }
}

fn spawn_extractor(
    extractor: Arc<dyn Extractor>,
    url: &str,
    html: &Arc<str>,
) -> JoinHandle<(&'static str, Option<Article>)> {
    let url = url.to_string();
    let html = Arc::clone(html);
    tokio::spawn(async move {
        let name = extractor.name();
        (name, extractor.extract(&url, Some(&*html)).await)
    })
}

/// A panicked strategy counts as "no result".
fn settle(
    url: &str,
    joined: Result<(&'static str, Option<Article>), JoinError>,
) -> Option<Article> {
    match joined {
        Ok((name, result)) => {
            debug!(url, extractor = name, found = result.is_some(), "extractor finished");
            result
        }
        Err(e) => {
            warn!(url, error = %e, "extractor task failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl Extractor for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn extract(&self, url: &str, _html: Option<&str>) -> Option<Article> {
            self.0.map(|content| {
                let mut article = Article::new(url);
                article.content = Some(content.to_string());
                article
            })
        }
    }

    struct Panics;

    #[async_trait]
    impl Extractor for Panics {
        fn name(&self) -> &'static str {
            "panics"
        }

        async fn extract(&self, _url: &str, _html: Option<&str>) -> Option<Article> {
            panic!("extractor blew up");
        }
    }

    fn scraper_with(
        metadata: Arc<dyn Extractor>,
        content: Arc<dyn Extractor>,
        selector: Arc<dyn Extractor>,
    ) -> Scraper {
        Scraper::builder()
            .metadata_extractor(metadata)
            .content_extractor(content)
            .selector_extractor(selector)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_defaults() {
        let scraper = Scraper::builder().build().unwrap();
        assert_eq!(scraper.batch_concurrency(), 5);
        assert!(scraper.cache().is_none());
        assert_eq!(scraper.extractors().metadata.name(), "metadata");
        assert_eq!(scraper.extractors().content.name(), "content");
        assert_eq!(scraper.extractors().selector.name(), "selector");
    }

    #[tokio::test]
    async fn panicking_extractor_counts_as_no_result() {
        let scraper = scraper_with(
            Arc::new(Panics),
            Arc::new(Fixed(Some("from content"))),
            Arc::new(Fixed(None)),
        );
        let results = scraper
            .run_extractors("https://example.com/a", Arc::from("<p>x</p>"))
            .await;
        assert!(results[0].is_none());
        assert_eq!(results[1].as_ref().unwrap().content.as_deref(), Some("from content"));
        assert!(results[2].is_none());
    }

    #[tokio::test]
    async fn invalid_url_becomes_error_article() {
        let scraper = Scraper::builder().max_attempts(1).build().unwrap();
        let article = scraper.scrape_article("not a url").await;
        assert!(article.is_failure());
        assert_eq!(article.url, "not a url");
        assert!(article.error.unwrap().contains("invalid URL"));
    }

    #[tokio::test]
    async fn empty_batch_is_empty() {
        let scraper = Scraper::builder().build().unwrap();
        let urls: [&str; 0] = [];
        assert!(scraper.scrape_multiple(&urls).await.is_empty());
    }
}

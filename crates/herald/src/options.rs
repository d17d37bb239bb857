// ABOUTME: Configuration options for the Herald scraper including ScraperOptions and ScraperBuilder.
// ABOUTME: ScraperBuilder provides a fluent API for constructing Scraper instances with custom settings.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::ArticleCache;
use crate::error::ScrapeError;
use crate::extractors::selectors::SelectorTable;
use crate::extractors::Extractor;
use crate::scraper::Scraper;

/// Default per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default number of fetch attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default fixed delay between fetch attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
/// Default number of URLs processed at once by `scrape_multiple`.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 5;
/// Default cache entry lifetime.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86_400);

/// Configuration options for the Herald scraper.
#[derive(Debug, Clone)]
pub struct ScraperOptions {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub batch_concurrency: usize,
    /// Extra request headers, layered over the browser defaults.
    pub headers: HashMap<String, String>,
    /// Overrides the attached cache's own lifetime when set.
    pub cache_ttl: Option<Duration>,
    pub selectors: SelectorTable,
    pub http_client: Option<reqwest::Client>,
}

impl Default for ScraperOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            headers: HashMap::new(),
            cache_ttl: None,
            selectors: SelectorTable::builtin(),
            http_client: None,
        }
    }
}

/// Builder for constructing Scraper instances with custom configuration.
#[derive(Clone, Default)]
pub struct ScraperBuilder {
    opts: ScraperOptions,
    cache: Option<ArticleCache>,
    metadata: Option<Arc<dyn Extractor>>,
    content: Option<Arc<dyn Extractor>>,
    selector: Option<Arc<dyn Extractor>>,
}

impl ScraperBuilder {
    /// Create a new ScraperBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the total number of fetch attempts. Values below 1 are treated as 1.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.opts.max_attempts = attempts.max(1);
        self
    }

    /// Set the fixed delay between fetch attempts.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.opts.retry_delay = delay;
        self
    }

    /// Set how many URLs a batch processes at once. Values below 1 are treated as 1.
    pub fn batch_concurrency(mut self, n: usize) -> Self {
        self.opts.batch_concurrency = n.max(1);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Set the lifetime of cache entries, overriding the TTL the cache was opened with.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.opts.cache_ttl = Some(ttl);
        self
    }

    /// Replace the selector table used by the structural extractor.
    pub fn selectors(mut self, table: SelectorTable) -> Self {
        self.opts.selectors = table;
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Attach a persistent article cache. Without one every request is a miss.
    pub fn cache(mut self, cache: ArticleCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the full-pipeline extractor.
    pub fn metadata_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.metadata = Some(extractor);
        self
    }

    /// Replace the cleaned-text extractor.
    pub fn content_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.content = Some(extractor);
        self
    }

    /// Replace the selector-driven extractor.
    pub fn selector_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.selector = Some(extractor);
        self
    }

    /// Build the Scraper with the configured options.
    pub fn build(self) -> Result<Scraper, ScrapeError> {
        let cache = match (self.cache, self.opts.cache_ttl) {
            (Some(cache), Some(ttl)) => Some(cache.with_ttl(ttl)),
            (cache, _) => cache,
        };
        Scraper::from_parts(
            self.opts,
            cache,
            self.metadata,
            self.content,
            self.selector,
        )
    }
}

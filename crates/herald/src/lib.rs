// ABOUTME: Main library entry point for the Herald news-article scraper.
// ABOUTME: Re-exports the public API: Scraper, ScraperBuilder, Article, ArticleCache, ScrapeError, and the extractors.

//! Herald - fetch a news article and extract it with several strategies at once.
//!
//! A [`Scraper`] downloads the page (with retry), runs three heterogeneous
//! extractors concurrently, keeps the best candidate and optionally caches it
//! on disk. Failures never surface as `Err`: they come back as an [`Article`]
//! with its `error` field set.
//!
//! # Example
//!
//! ```no_run
//! use digests_herald::{ArticleCache, ScrapeError, Scraper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ScrapeError> {
//!     let scraper = Scraper::builder()
//!         .cache(ArticleCache::open(".herald-cache").await?)
//!         .build()?;
//!     let article = scraper.scrape_article("https://example.com/news/story").await;
//!     println!("{}", serde_json::to_string_pretty(&article).unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod arbitrate;
pub mod article;
pub mod cache;
pub mod dom;
pub mod error;
pub mod extractors;
pub mod fetch;
pub mod nlp;
pub mod options;
pub mod scraper;

pub use crate::arbitrate::arbitrate;
pub use crate::article::Article;
pub use crate::cache::{ArticleCache, CacheEntry};
pub use crate::error::{ErrorCode, ScrapeError};
pub use crate::extractors::selectors::{SelectorProfile, SelectorTable};
pub use crate::extractors::{
    ContentExtractor, Extractor, ExtractorSet, MetadataExtractor, SelectorExtractor,
};
pub use crate::fetch::{FetchedPage, Fetcher};
pub use crate::options::{ScraperBuilder, ScraperOptions};
pub use crate::scraper::Scraper;

// ABOUTME: Extraction strategies that turn a page into a candidate Article.
// ABOUTME: Defines the Extractor trait and the default set of three heterogeneous strategies.

//! Content extraction strategies.
//!
//! Every strategy implements [`Extractor`] and reports "no result" as `None`
//! rather than an error; internal failures are logged and absorbed.
//!
//! Submodules:
//! - `metadata`: full pipeline with its own download, readability scoring and NLP.
//! - `content`: cleaned text by stopword density with its own download.
//! - `selector`: domain-aware CSS locators over the already fetched body.
//! - `selectors`: the selector table and its JSON loading.
//! - `compiled`, `select`, `fields`: shared DOM helpers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::article::Article;
use crate::fetch::Fetcher;

pub mod compiled;
pub mod content;
pub mod fields;
pub mod metadata;
pub mod select;
pub mod selector;
pub mod selectors;

pub use content::ContentExtractor;
pub use metadata::MetadataExtractor;
pub use selector::SelectorExtractor;

/// One way of extracting an article.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Extract `url`. `html` is the body already fetched by the caller; strategies
    /// that download the page themselves may ignore it.
    async fn extract(&self, url: &str, html: Option<&str>) -> Option<Article>;
}

/// The three strategies in arbitration priority order.
#[derive(Clone)]
pub struct ExtractorSet {
    pub metadata: Arc<dyn Extractor>,
    pub content: Arc<dyn Extractor>,
    pub selector: Arc<dyn Extractor>,
}

impl ExtractorSet {
    /// Default strategies sharing one fetcher and the given selector table.
    pub fn standard(fetcher: &Fetcher, selectors: selectors::SelectorTable) -> Self {
        Self {
            metadata: Arc::new(MetadataExtractor::new(fetcher.clone())),
            content: Arc::new(ContentExtractor::new(fetcher.clone())),
            selector: Arc::new(SelectorExtractor::new(selectors)),
        }
    }

    /// Strategies in priority order.
    pub fn in_priority(&self) -> [Arc<dyn Extractor>; 3] {
        [
            Arc::clone(&self.metadata),
            Arc::clone(&self.content),
            Arc::clone(&self.selector),
        ]
    }
}

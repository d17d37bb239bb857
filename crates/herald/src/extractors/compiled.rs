// ABOUTME: Process-wide cache of compiled dom_query matchers keyed by selector text.
// ABOUTME: Selector profiles are compiled once and shared by every structural extraction.

//! Selector caching for repeated DOM queries.
//!
//! Every page from the same site runs the same locators, so compiling them per
//! request is wasted work. Invalid selectors are cached as `None` so a bad
//! profile entry is only reported once.

use std::collections::HashMap;
use std::sync::RwLock;

use dom_query::Matcher;
use once_cell::sync::Lazy;
use tracing::warn;

use crate::extractors::selectors::SelectorTable;

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Matcher>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `None` for selectors that do not parse.
pub fn get_or_compile(css: &str) -> Option<Matcher> {
    {
        let cache = SELECTOR_CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Matcher::new(css).ok();
    if compiled.is_none() {
        warn!(selector = css, "invalid CSS selector");
    }

    let mut cache = SELECTOR_CACHE.write().unwrap_or_else(|e| e.into_inner());
    // Another thread may have inserted while we compiled.
    cache
        .entry(css.to_string())
        .or_insert(compiled)
        .clone()
}

/// Compiles every locator of `table` ahead of the first extraction.
pub fn warm(table: &SelectorTable) {
    for css in table.locators() {
        get_or_compile(css);
    }
}

// ABOUTME: dom_query helpers that read the first element matching a locator as text or attributes.
// ABOUTME: Used by the selector-driven extractor with matchers from the compiled cache.

//! Selector-based field reading.
//!
//! Key behaviors:
//! - Only the first element matching a locator is read (document order).
//! - Inline text is whitespace-normalized; block text keeps its line structure
//!   with each line trimmed and blank lines dropped.
//! - Invalid selectors behave like selectors with no match.

use dom_query::Document;

use crate::extractors::compiled::get_or_compile;
use crate::extractors::fields::normalize_whitespace;

/// Whitespace-normalized text of the first element matching `css`.
pub fn first_text(doc: &Document, css: &str) -> Option<String> {
    let text = first_raw_text(doc, css)?;
    let normalized = normalize_whitespace(&text);
    (!normalized.is_empty()).then_some(normalized)
}

/// Text of the first element matching `css`, one trimmed line per source line.
pub fn first_block_text(doc: &Document, css: &str) -> Option<String> {
    let text = first_raw_text(doc, css)?;
    let tidy = tidy_lines(&text);
    (!tidy.is_empty()).then_some(tidy)
}

/// Non-empty trimmed values of `attr` on every element matching `css`, in document order.
pub fn all_attr(doc: &Document, css: &str, attr: &str) -> Vec<String> {
    let matcher = match get_or_compile(css) {
        Some(m) => m,
        None => return vec![],
    };

    doc.select_matcher(&matcher)
        .iter()
        .filter_map(|el| {
            el.attr(attr).and_then(|v| {
                let trimmed = v.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
        })
        .collect()
}

fn first_raw_text(doc: &Document, css: &str) -> Option<String> {
    let matcher = get_or_compile(css)?;
    let first = doc.select_matcher(&matcher).iter().next()?;
    Some(first.text().to_string())
}

/// Trims every line and drops the blank ones.
pub fn tidy_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

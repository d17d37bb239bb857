// ABOUTME: Generic field helpers shared by the extractors: meta tags, attributes, text, dates, URLs.
// ABOUTME: Selectors are tried in order and the first non-empty match wins.

//! Generic field extraction utilities.
//!
//! Key behaviors:
//! - Selectors are tried in order; first non-empty match wins.
//! - Whitespace is normalized (collapsed to single spaces, trimmed).
//! - Empty strings are treated as no match.
//! - Dates become RFC 3339 when they can be parsed.

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use url::Url;

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts the `content` attribute from the first matching meta tag.
pub fn extract_meta_content(doc: &Html, selector: &str) -> Option<String> {
    extract_attr_first(doc, selector, "content")
}

/// Extracts an attribute value from the first matching element that has a non-empty one.
pub fn extract_attr_first(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel).find_map(|el| {
        el.value()
            .attr(attr)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// Tries each selector in order and returns the first non-empty attribute value.
pub fn extract_first_attr(doc: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    selectors
        .iter()
        .find_map(|sel| extract_attr_first(doc, sel, attr))
}

/// Collects every non-empty, whitespace-normalized value for `selector`.
///
/// Meta tags contribute their `content` attribute, other elements their text.
pub fn extract_all_values(doc: &Html, selector: &str) -> Vec<String> {
    let sel = match Selector::parse(selector) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };
    doc.select(&sel)
        .filter_map(|el| {
            let raw = if el.value().name() == "meta" {
                el.value().attr("content").unwrap_or("").to_string()
            } else {
                el.text().collect::<Vec<_>>().join(" ")
            };
            let normalized = normalize_whitespace(&raw);
            (!normalized.is_empty()).then_some(normalized)
        })
        .collect()
}

/// Returns the first non-empty value from a prioritized selector list.
///
/// Meta tags yield their `content` attribute; other elements their normalized text.
pub fn extract_field_text_single(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .find_map(|sel| extract_all_values(doc, sel).into_iter().next())
}

/// Parse a date string, trying RFC 3339 first, then loose day/month/year
/// patterns, then dateparser.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Date-only forms are pinned to midnight UTC so the day never shifts.
    const LOOSE_PATTERNS: &[&str] = &[
        "%b %e, %Y",
        "%e %b %Y",
        "%b %d, %Y",
        "%d %b %Y",
        "%B %e, %Y",
        "%e %B %Y",
        "%B %d, %Y",
        "%d %B %Y",
        "%Y-%m-%d",
    ];
    for pat in LOOSE_PATTERNS {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(s, pat) {
            let naive_dt = date.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(naive_dt, Utc));
        }
    }

    dateparser::parse(s).ok().map(|dt| dt.with_timezone(&Utc))
}

/// RFC 3339 rendering of `raw` when it parses as a date, otherwise the trimmed raw text.
pub fn normalize_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        parse_date(trimmed)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| trimmed.to_string()),
    )
}

/// Resolve `src` against `base`, returning an absolute http(s) URL.
pub fn resolve_url(base: &Url, src: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }
    let resolved = base.join(src).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Push `value` unless it is already present, keeping first-seen order.
pub fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

// ABOUTME: DOM traversal utilities over scraper's HTML document tree.
// ABOUTME: Holds readability scoring and block-text rendering used by the extractors.

//! DOM utilities for HTML documents.
//!
//! - `scoring`: readability-style candidate scoring and sibling merging.
//! - `text`: plain-text rendering that keeps paragraph boundaries.

pub mod scoring;
pub mod text;

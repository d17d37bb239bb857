// ABOUTME: Readability-style node scoring used to locate the main article body.
// ABOUTME: Provides score_content, find_top_candidate, and sibling merging over a scraper Html tree.

use std::collections::HashMap;

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static PARAGRAPH_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(p|li|span|pre)$").unwrap());
static CONTAINER_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(td|blockquote|ol|ul|dl)$").unwrap());
static FORM_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(address|form)$").unwrap());
pub static NON_TOP_CANDIDATE_TAGS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(br|b|i|label|hr|area|base|basefont|input|img|link|meta)$").unwrap()
});
static POSITIVE_HINTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)article|articlecontent|instapaper_body|blog|body|content|entry-content-asset|entry|hentry|main|Normal|page|pagination|permalink|post|story|text|[-_]copy").unwrap()
});
static NEGATIVE_HINTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)adbox|advert|author|bio|bookmark|bottom|byline|clear|com-|combx|comment|contact|copy|credit|crumb|date|deck|excerpt|featured|foot|footer|footnote|graf|head|info|infotext|instapaper_ignore|jump|linebreak|link|masthead|media|meta|modal|outbrain|promo|pr_|related|respond|roundcontent|scroll|secondary|share|shopping|shoutbox|side|sidebar|sponsor|stamp|sub|summary|tags|tools|widget").unwrap()
});
static PHOTO_HINTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)figure|photo|image|caption").unwrap());
static ASSET_HINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)entry-content-asset").unwrap());

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p, pre").unwrap());
static ANY: Lazy<Selector> = Lazy::new(|| Selector::parse("*").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// hNews (container, body) pairs whose container gets a flat boost.
const HNEWS_PAIRS: &[(&str, &str)] = &[
    (".hentry", ".entry-content"),
    ("entry", ".entry-content"),
    (".entry", ".entry_content"),
    (".post", ".postbody"),
    (".post", ".post_body"),
    (".post", ".post-body"),
];

const HNEWS_BOOST: i32 = 80;

/// Scores keyed by node.
pub type NodeScores = HashMap<NodeId, i32>;

fn get_score_for(node_id: NodeId, scores: &NodeScores) -> i32 {
    scores.get(&node_id).copied().unwrap_or(0)
}

/// Base score of a paragraph's text: commas, length in 50-byte chunks,
/// a penalty for fragments and a bonus for mid-sized blocks.
fn score_paragraph(text: &str) -> i32 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }
    let len = text.len();
    let mut score = text.matches(',').count() as i32 + (len / 50) as i32;
    if len < 20 {
        score -= 10;
    }
    if (50..=200).contains(&len) {
        score += 5;
    }
    score
}

/// Score an element by its tag alone.
fn score_node(element: &ElementRef) -> i32 {
    let tag = element.value().name();
    if PARAGRAPH_TAGS.is_match(tag) {
        return score_paragraph(&element.text().collect::<String>());
    }
    match tag.to_ascii_lowercase().as_str() {
        "div" => 5,
        "th" => -5,
        t if CONTAINER_TAGS.is_match(t) => 3,
        t if FORM_TAGS.is_match(t) => -3,
        _ => 0,
    }
}

/// Weight from class and id hints. An id hint takes precedence over class hints.
pub fn get_weight(element: &ElementRef) -> i32 {
    let class = element.value().attr("class").unwrap_or("");
    let id = element.value().attr("id").unwrap_or("");

    let hint = |s: &str| -> i32 {
        let mut w = 0;
        if POSITIVE_HINTS.is_match(s) {
            w += 25;
        }
        if NEGATIVE_HINTS.is_match(s) {
            w -= 25;
        }
        w
    };

    let mut score = if id.is_empty() { 0 } else { hint(id) };
    if !class.is_empty() {
        if score == 0 {
            score += hint(class);
        }
        if PHOTO_HINTS.is_match(class) {
            score += 10;
        }
        if ASSET_HINT.is_match(class) {
            score += 25;
        }
    }
    score
}

/// Share of an element's text that sits inside links.
pub fn link_density(element: &ElementRef) -> f64 {
    let total_len: usize = element.text().map(str::len).sum();
    if total_len == 0 {
        return 0.0;
    }
    let link_len: usize = element
        .select(&ANCHOR)
        .flat_map(|a| a.text())
        .map(str::len)
        .sum();
    link_len as f64 / total_len as f64
}

/// True when the trimmed text ends like a sentence.
pub fn has_sentence_end(text: &str) -> bool {
    matches!(
        text.trim_end().chars().last(),
        Some('.' | '!' | '?' | ':' | ';')
    )
}

pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct Scorer {
    scores: NodeScores,
    weight_nodes: bool,
}

impl Scorer {
    /// Existing score, or the element's own score (recorded on first sight,
    /// a quarter of it bubbling to the parent).
    fn init(&mut self, element: &ElementRef) -> i32 {
        let existing = get_score_for(element.id(), &self.scores);
        if existing != 0 {
            return existing;
        }
        let mut score = score_node(element);
        if self.weight_nodes {
            score += get_weight(element);
        }
        if let Some(parent) = element.parent().and_then(ElementRef::wrap) {
            *self.scores.entry(parent.id()).or_insert(0) += (score as f64 * 0.25) as i32;
        }
        score
    }

    fn add(&mut self, element: &ElementRef, amount: i32) {
        let base = self.init(element);
        self.scores.insert(element.id(), base + amount);
    }
}

/// Score every candidate node in the document.
///
/// hNews containers are boosted first, then paragraphs are scored in two passes,
/// each adding its raw score to the parent and half of it to the grandparent.
pub fn score_content(doc: &Html, weight_nodes: bool) -> NodeScores {
    let mut scorer = Scorer {
        scores: HashMap::new(),
        weight_nodes,
    };

    for (container, body) in HNEWS_PAIRS {
        let (Ok(pair), Ok(container_sel)) = (
            Selector::parse(&format!("{} {}", container, body)),
            Selector::parse(container),
        ) else {
            continue;
        };
        for element in doc.select(&pair) {
            let owner = element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| container_sel.matches(a));
            if let Some(owner) = owner {
                scorer.add(&owner, HNEWS_BOOST);
            }
        }
    }

    for _ in 0..2 {
        for element in doc.select(&PARAGRAPHS) {
            if scorer.scores.contains_key(&element.id()) {
                continue;
            }
            let own = scorer.init(&element);
            scorer.scores.insert(element.id(), own);

            let raw = score_node(&element);
            if let Some(parent) = element.parent().and_then(ElementRef::wrap) {
                scorer.add(&parent, raw);
                if let Some(grandparent) = parent.parent().and_then(ElementRef::wrap) {
                    scorer.add(&grandparent, raw / 2);
                }
            }
        }
    }

    scorer.scores
}

/// Highest-scoring element, ignoring inline tags and `<body>`; link-heavy
/// candidates are scaled down by their link density. Falls back to `<body>`.
pub fn find_top_candidate<'a>(doc: &'a Html, scores: &NodeScores) -> Option<ElementRef<'a>> {
    let mut best: Option<(i32, ElementRef<'a>)> = None;

    for element in doc.select(&ANY) {
        let Some(&score) = scores.get(&element.id()) else {
            continue;
        };
        let tag = element.value().name();
        if tag.eq_ignore_ascii_case("body") || NON_TOP_CANDIDATE_TAGS_RE.is_match(tag) {
            continue;
        }

        let density = link_density(&element);
        let adjusted = if density > 0.5 {
            (score as f64 * (1.0 - density)).round() as i32
        } else {
            score
        };

        if adjusted > best.map_or(0, |(s, _)| s) {
            best = Some((adjusted, element));
        }
    }

    best.map(|(_, el)| el)
        .or_else(|| doc.select(&BODY).next())
}

/// Collect the candidate plus any siblings that look like part of the same body.
///
/// Siblings qualify by score (with link-density and class-match adjustments)
/// or, for paragraphs, by length and punctuation. Order follows the document.
pub fn merge_siblings<'a>(
    candidate: ElementRef<'a>,
    top_score: i32,
    scores: &NodeScores,
) -> Vec<ElementRef<'a>> {
    let parent_node = match candidate.parent() {
        Some(p) => p,
        None => return vec![candidate],
    };

    let sibling_threshold = 10i32.max((top_score as f64 * 0.25) as i32);
    let candidate_class = candidate.value().attr("class").unwrap_or("");

    let mut included: Vec<ElementRef<'a>> = Vec::new();
    for child in parent_node.children() {
        let Some(sibling) = ElementRef::wrap(child) else {
            continue;
        };
        if sibling.id() == candidate.id() {
            included.push(sibling);
            continue;
        }

        let tag_name = sibling.value().name().to_lowercase();
        if NON_TOP_CANDIDATE_TAGS_RE.is_match(&tag_name) {
            continue;
        }

        let sibling_score = get_score_for(sibling.id(), scores);
        if sibling_score <= 0 {
            continue;
        }

        let density = link_density(&sibling);
        if density >= 0.5 {
            continue;
        }

        let mut content_bonus = 0i32;
        if density < 0.05 {
            content_bonus += 20;
        }
        let sibling_class = sibling.value().attr("class").unwrap_or("");
        if !sibling_class.is_empty() && sibling_class == candidate_class {
            content_bonus += (top_score as f64 * 0.2) as i32;
        }

        if sibling_score + content_bonus >= sibling_threshold {
            included.push(sibling);
            continue;
        }

        if tag_name == "p" {
            let sibling_text = sibling.text().collect::<String>();
            let text_len = normalize_spaces(&sibling_text).len();
            if (text_len > 80 && density < 0.25)
                || (text_len <= 80 && density == 0.0 && has_sentence_end(&sibling_text))
            {
                included.push(sibling);
            }
        }
    }

    included
}

/// Score the document and return the elements that make up the main body.
pub fn extract_best_nodes(doc: &Html) -> Vec<ElementRef<'_>> {
    let scores = score_content(doc, true);
    let Some(candidate) = find_top_candidate(doc, &scores) else {
        return Vec::new();
    };
    let top_score = get_score_for(candidate.id(), &scores);
    merge_siblings(candidate, top_score, &scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_paragraph() {
        assert_eq!(score_paragraph(""), 0);
        assert!(score_paragraph("Hi") < 0);

        // one comma, one 50-byte chunk, mid-size bonus
        let medium = "This is a medium length paragraph with some commas, and more text.";
        assert_eq!(score_paragraph(medium), 1 + 1 + 5);
    }

    #[test]
    fn test_get_weight() {
        let html = r#"<div class="article-content" id="main">test</div>"#;
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("div").unwrap();
        let el = doc.select(&sel).next().unwrap();

        // id hint wins; class adds nothing more once the id scored
        assert_eq!(get_weight(&el), 25);
    }

    #[test]
    fn test_link_density() {
        let html = r##"<div>Some text <a href="#">link</a> more text</div>"##;
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("div").unwrap();
        let el = doc.select(&sel).next().unwrap();

        let density = link_density(&el);
        assert!(density > 0.0 && density < 1.0);
    }

    #[test]
    fn test_has_sentence_end() {
        assert!(has_sentence_end("This is a sentence."));
        assert!(has_sentence_end("Is this a question?"));
        assert!(has_sentence_end("Important!"));
        assert!(!has_sentence_end("No ending here"));
    }

    #[test]
    fn test_hnews_container_is_boosted() {
        let html = r#"
            <html><body>
                <article class="hentry">
                    <div class="entry-content">
                        <p>This is a paragraph with some content, and commas, to score well.</p>
                        <p>Another paragraph with more text and details about the article.</p>
                    </div>
                </article>
            </body></html>
        "#;
        let doc = Html::parse_document(html);
        let scores = score_content(&doc, true);

        let sel = Selector::parse("article.hentry").unwrap();
        let article = doc.select(&sel).next().unwrap();
        assert!(get_score_for(article.id(), &scores) >= HNEWS_BOOST);
    }

    #[test]
    fn test_extract_best_nodes() {
        let html = r#"
            <html><body>
                <nav>Navigation links</nav>
                <article>
                    <p>This is the main article content with multiple paragraphs.</p>
                    <p>The second paragraph has more information, details, and context.</p>
                    <p>A third paragraph rounds out the article nicely.</p>
                </article>
                <aside>Sidebar content</aside>
            </body></html>
        "#;
        let doc = Html::parse_document(html);
        let nodes = extract_best_nodes(&doc);

        assert!(!nodes.is_empty());
        let text: String = nodes.iter().flat_map(|n| n.text()).collect();
        assert!(text.contains("main article content"));
        assert!(!text.contains("Navigation links"));
    }

    #[test]
    fn test_merge_siblings_keeps_document_order() {
        let html = r#"
            <html><body><div id="wrap">
                <p>An opening paragraph that is long enough to be merged with the candidate body text.</p>
                <div class="story">
                    <p>Body paragraph one, with commas, and enough length to score decently here.</p>
                    <p>Body paragraph two, with commas, and enough length to score decently here.</p>
                </div>
                <p>Short end.</p>
            </div></body></html>
        "#;
        let doc = Html::parse_document(html);
        let scores = score_content(&doc, true);
        let sel = Selector::parse("div.story").unwrap();
        let candidate = doc.select(&sel).next().unwrap();
        let top = get_score_for(candidate.id(), &scores);

        let merged = merge_siblings(candidate, top, &scores);
        let names: Vec<_> = merged.iter().map(|e| e.value().name()).collect();
        assert_eq!(names.first(), Some(&"p"));
        assert!(merged.iter().any(|e| e.id() == candidate.id()));
    }
}
